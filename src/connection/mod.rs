//! Broker Connections
//!
//! A [`Connection`] wraps one transport ([`BrokerConnection`]) or fails over
//! across several ([`ConnectionSpool`]). Channels, queues and exchanges are
//! handed out by factories that observe the connection and forget their
//! cached objects when it is torn down or re-established.
//!
//! ```rust
//! use amqp_runner::connection::{self, ChannelFactory, QueueFactory};
//! use amqp_runner::transport::{Dsn, DriverRegistry, MemoryBroker};
//! use std::sync::Arc;
//!
//! let registry = DriverRegistry::with_memory(Arc::new(MemoryBroker::new()));
//! let connection = connection::open(&registry, &Dsn::parse("memory://a,b").unwrap()).unwrap();
//! let queues = QueueFactory::new(ChannelFactory::new(connection));
//!
//! let jobs = queues.queue("jobs").unwrap();
//! jobs.declare().unwrap();
//! assert_eq!(jobs.count().unwrap(), 0);
//! ```

mod broker;
mod exchange;
mod factory;
mod observer;
mod queue;
mod spool;
mod topology;

#[cfg(test)]
mod tests;

pub use broker::BrokerConnection;
pub use exchange::Exchange;
pub use factory::{ChannelFactory, ExchangeFactory, QueueFactory};
pub use observer::{ConnectionEvent, ConnectionObserver, ConnectionSubject};
pub use queue::{Queue, ReceiveCallback};
pub use spool::ConnectionSpool;
pub use topology::Topology;

use crate::error::Result;
use crate::transport::{Channel, DriverRegistry, Dsn};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// A possibly reconnecting link to a broker
pub trait Connection: Send + Sync {
    fn endpoint(&self) -> String;

    fn connect(&self) -> Result<()>;

    /// Tear the link down and notify observers
    fn disconnect(&self) -> Result<()>;

    /// Re-establish the link and notify observers
    fn reconnect(&self) -> Result<()>;

    fn is_connected(&self) -> bool;

    fn read_timeout(&self) -> Duration;

    fn set_read_timeout(&self, timeout: Duration);

    /// Open a channel, connecting first if needed
    fn open_channel(&self) -> Result<Arc<dyn Channel>>;

    fn attach(&self, observer: Weak<dyn ConnectionObserver>);

    fn detach(&self, observer: &Weak<dyn ConnectionObserver>);
}

/// Connection for `dsn`: a spool when it names several hosts
pub fn open(registry: &DriverRegistry, dsn: &Dsn) -> Result<Arc<dyn Connection>> {
    if dsn.hosts.len() > 1 {
        Ok(Arc::new(ConnectionSpool::from_dsn(registry, dsn)?))
    } else {
        Ok(Arc::new(BrokerConnection::new(registry.create_transport(dsn)?)))
    }
}
