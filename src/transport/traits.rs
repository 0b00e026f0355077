//! Capability traits implemented by broker drivers

use crate::error::Result;
use crate::message::{Acknowledger, Message};
use crate::transport::{Binding, Dsn, ExchangeDefinition, QueueDefinition};
use std::sync::Arc;
use std::time::Duration;

/// A message as handed over by a channel, before it is bound to a queue
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub message: Message,
    pub delivery_tag: u64,
    pub exchange: String,
    pub routing_key: String,
    pub redelivered: bool,
}

/// Callback driven by [`Channel::consume`]
///
/// Receives `Some` for every delivery and `None` for an idle tick while the
/// channel waits. Returning `Ok(false)` ends consumption.
pub type ConsumeCallback<'a> = dyn FnMut(Option<Delivery>) -> Result<bool> + 'a;

/// A channel on an open broker connection
///
/// All methods take `&self`; implementations lock internally so a delivery
/// can be acknowledged from inside the consume callback.
pub trait Channel: Acknowledger {
    fn set_prefetch_count(&self, count: u16) -> Result<()>;

    fn prefetch_count(&self) -> u16;

    /// Read timeout of the owning connection, zero means wait forever
    fn read_timeout(&self) -> Duration;

    fn tx_select(&self) -> Result<()>;

    fn tx_commit(&self) -> Result<()>;

    fn tx_rollback(&self) -> Result<()>;

    fn declare_exchange(&self, definition: &ExchangeDefinition) -> Result<()>;

    fn bind_exchange(&self, destination: &str, binding: &Binding) -> Result<()>;

    fn unbind_exchange(&self, destination: &str, binding: &Binding) -> Result<()>;

    /// Declare a queue and return its ready message count
    ///
    /// A passive declare only checks that the queue exists.
    fn declare_queue(&self, definition: &QueueDefinition, passive: bool) -> Result<u32>;

    fn bind_queue(&self, queue: &str, binding: &Binding) -> Result<()>;

    fn unbind_queue(&self, queue: &str, binding: &Binding) -> Result<()>;

    fn publish(&self, exchange: &str, routing_key: &str, message: &Message) -> Result<()>;

    /// Blocking push consumption
    ///
    /// Fails with `ConsumerTimeoutExceed` once the read timeout passes without
    /// a delivery. Returns `Ok` when the callback declines to continue or the
    /// consumer tag is cancelled.
    fn consume(&self, queue: &str, consumer_tag: &str, callback: &mut ConsumeCallback<'_>)
        -> Result<()>;

    /// Non-blocking fetch of a single delivery
    fn get(&self, queue: &str) -> Result<Option<Delivery>>;

    fn cancel(&self, consumer_tag: &str) -> Result<()>;

    /// Drop every ready message and return how many were removed
    fn purge(&self, queue: &str) -> Result<u32>;

    fn close(&self) -> Result<()>;

    fn is_open(&self) -> bool;
}

/// One connection to one broker endpoint
pub trait Transport: Send + Sync {
    /// `host:port` this transport talks to
    fn endpoint(&self) -> String;

    fn connect(&self) -> Result<()>;

    fn disconnect(&self) -> Result<()>;

    fn is_connected(&self) -> bool;

    fn read_timeout(&self) -> Duration;

    fn set_read_timeout(&self, timeout: Duration);

    fn open_channel(&self) -> Result<Arc<dyn Channel>>;
}

/// Builds transports for one DSN scheme
pub trait Driver: Send + Sync {
    fn create_transport(&self, dsn: &Dsn) -> Result<Box<dyn Transport>>;
}
