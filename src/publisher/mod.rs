//! Publishing
//!
//! [`ExchangePublisher`] threads every outbound message through its
//! middleware pipeline and publishes it on an exchange. [`SavepointPublisher`]
//! wraps any publisher with nested, named buffers, and the [`Transactional`]
//! facade exposes begin/commit/rollback over either native broker
//! transactions or savepoints.
//!
//! ```rust
//! use amqp_runner::message::Message;
//! use amqp_runner::publisher::{Publisher, SavepointPublisher};
//!
//! #[derive(Default)]
//! struct Recording(Vec<String>);
//!
//! impl Publisher for Recording {
//!     fn publish(&mut self, message: Message, _routing_key: &str) -> amqp_runner::Result<()> {
//!         self.0.push(message.payload().as_text().unwrap_or_default().to_string());
//!         Ok(())
//!     }
//! }
//!
//! let mut publisher = SavepointPublisher::new(Recording::default());
//! publisher.start("outer").unwrap();
//! publisher.publish(Message::new("kept"), "key").unwrap();
//! publisher.start("inner").unwrap();
//! publisher.publish(Message::new("discarded"), "key").unwrap();
//! publisher.rollback("inner").unwrap();
//! publisher.flush().unwrap();
//!
//! assert_eq!(publisher.inner().0, vec!["kept"]);
//! ```

mod exchange;
mod savepoint;
mod transaction;

#[cfg(test)]
mod tests;

pub use exchange::ExchangePublisher;
pub use savepoint::SavepointPublisher;
pub use transaction::{ChannelTransaction, SavepointTransaction, Transactional};

use crate::error::Result;
use crate::message::Message;

pub trait Publisher {
    fn publish(&mut self, message: Message, routing_key: &str) -> Result<()>;
}

impl<P: Publisher + ?Sized> Publisher for &mut P {
    fn publish(&mut self, message: Message, routing_key: &str) -> Result<()> {
        (**self).publish(message, routing_key)
    }
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&mut self, message: Message, routing_key: &str) -> Result<()> {
        (**self).publish(message, routing_key)
    }
}
