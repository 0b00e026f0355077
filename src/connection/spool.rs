//! Failover across several broker endpoints

use crate::connection::{
    BrokerConnection, Connection, ConnectionEvent, ConnectionObserver, ConnectionSubject,
};
use crate::core::sync::lock;
use crate::error::{Error, Result};
use crate::transport::{Channel, DriverRegistry, Dsn};
use log::{info, warn};
use rand::seq::SliceRandom;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// A set of connections of which exactly one is current
///
/// Every call is forwarded to the current member. Connecting walks the
/// members in order starting at the current one and settles on the first
/// that accepts; only connection failures move on to the next member.
pub struct ConnectionSpool {
    members: Vec<BrokerConnection>,
    current: Mutex<usize>,
    subject: ConnectionSubject,
}

impl ConnectionSpool {
    pub fn new(members: Vec<BrokerConnection>) -> Result<Self> {
        if members.is_empty() {
            return Err(Error::configuration("a connection spool needs at least one member"));
        }
        Ok(Self {
            members,
            current: Mutex::new(0),
            subject: ConnectionSubject::new(),
        })
    }

    /// One member per host of `dsn`, shuffled first when the DSN asks for it
    pub fn from_dsn(registry: &DriverRegistry, dsn: &Dsn) -> Result<Self> {
        let mut hosts = dsn.expand();
        if dsn.shuffle() {
            hosts.shuffle(&mut rand::thread_rng());
        }
        let members = hosts
            .iter()
            .map(|host| registry.create_transport(host).map(BrokerConnection::new))
            .collect::<Result<Vec<_>>>()?;
        Self::new(members)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn current_index(&self) -> Result<usize> {
        Ok(*lock(&self.current)?)
    }

    fn current(&self) -> Result<&BrokerConnection> {
        let index = self.current_index()?;
        Ok(&self.members[index])
    }

    fn connect_from_current(&self) -> Result<()> {
        let start = self.current_index()?;
        let mut last_error = None;

        for offset in 0..self.members.len() {
            let index = (start + offset) % self.members.len();
            let member = &self.members[index];
            match member.connect() {
                Ok(()) => {
                    if index != start {
                        *lock(&self.current)? = index;
                        info!("failed over to {}", member.endpoint());
                        self.subject.notify(ConnectionEvent::Reconnected);
                    }
                    return Ok(());
                }
                Err(e) if e.is_connection_error() => {
                    warn!("{}: {}", member.endpoint(), e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::configuration("connection spool is empty")))
    }
}

impl Connection for ConnectionSpool {
    fn endpoint(&self) -> String {
        self.current()
            .map(|member| member.endpoint())
            .unwrap_or_default()
    }

    fn connect(&self) -> Result<()> {
        if self.current()?.is_connected() {
            return Ok(());
        }
        self.connect_from_current()
    }

    fn disconnect(&self) -> Result<()> {
        self.current()?.disconnect()?;
        self.subject.notify(ConnectionEvent::Disconnected);
        Ok(())
    }

    fn reconnect(&self) -> Result<()> {
        self.current()?.disconnect()?;
        self.connect_from_current()?;
        self.subject.notify(ConnectionEvent::Reconnected);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.current().is_ok_and(|member| member.is_connected())
    }

    fn read_timeout(&self) -> Duration {
        self.current()
            .map(|member| member.read_timeout())
            .unwrap_or_default()
    }

    fn set_read_timeout(&self, timeout: Duration) {
        for member in &self.members {
            member.set_read_timeout(timeout);
        }
    }

    fn open_channel(&self) -> Result<Arc<dyn Channel>> {
        self.connect()?;
        self.current()?.open_channel()
    }

    fn attach(&self, observer: Weak<dyn ConnectionObserver>) {
        self.subject.attach(observer);
    }

    fn detach(&self, observer: &Weak<dyn ConnectionObserver>) {
        self.subject.detach(observer);
    }
}
