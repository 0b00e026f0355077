//! Single-endpoint connection

use crate::connection::{Connection, ConnectionEvent, ConnectionObserver, ConnectionSubject};
use crate::error::Result;
use crate::transport::{Channel, Transport};
use log::{debug, info};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Connection over one driver transport
///
/// Connects lazily on the first channel open and tells its observers when
/// the underlying link is torn down or re-established.
pub struct BrokerConnection {
    transport: Box<dyn Transport>,
    subject: ConnectionSubject,
}

impl BrokerConnection {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            subject: ConnectionSubject::new(),
        }
    }
}

impl Connection for BrokerConnection {
    fn endpoint(&self) -> String {
        self.transport.endpoint()
    }

    fn connect(&self) -> Result<()> {
        if !self.transport.is_connected() {
            self.transport.connect()?;
            info!("connected to {}", self.endpoint());
        }
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.transport.disconnect()?;
        debug!("disconnected from {}", self.endpoint());
        self.subject.notify(ConnectionEvent::Disconnected);
        Ok(())
    }

    fn reconnect(&self) -> Result<()> {
        self.transport.disconnect()?;
        self.transport.connect()?;
        debug!("reconnected to {}", self.endpoint());
        self.subject.notify(ConnectionEvent::Reconnected);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    fn read_timeout(&self) -> Duration {
        self.transport.read_timeout()
    }

    fn set_read_timeout(&self, timeout: Duration) {
        self.transport.set_read_timeout(timeout);
    }

    fn open_channel(&self) -> Result<Arc<dyn Channel>> {
        self.connect()?;
        self.transport.open_channel()
    }

    fn attach(&self, observer: Weak<dyn ConnectionObserver>) {
        self.subject.attach(observer);
    }

    fn detach(&self, observer: &Weak<dyn ConnectionObserver>) {
        self.subject.detach(observer);
    }
}
