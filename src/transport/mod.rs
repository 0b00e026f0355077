//! Broker Transport
//!
//! The capability boundary between the runtime and a message broker. The
//! runtime only talks to [`Transport`] and [`Channel`] trait objects; a
//! [`Driver`] turns a parsed [`Dsn`] into a transport and the
//! [`DriverRegistry`] picks the driver by scheme.
//!
//! The bundled `memory` driver keeps a complete broker in process, so every
//! consumer mode can run and be tested without a network broker:
//!
//! ```rust
//! use amqp_runner::message::{Acknowledger, Message};
//! use amqp_runner::transport::{Dsn, DriverRegistry, MemoryBroker, QueueDefinition};
//! use std::sync::Arc;
//!
//! let registry = DriverRegistry::with_memory(Arc::new(MemoryBroker::new()));
//! let transport = registry.create_transport(&Dsn::parse("memory://localhost").unwrap()).unwrap();
//! transport.connect().unwrap();
//!
//! let channel = transport.open_channel().unwrap();
//! channel.declare_queue(&QueueDefinition::new("jobs"), false).unwrap();
//! channel.publish("", "jobs", &Message::new("hello")).unwrap();
//!
//! let delivery = channel.get("jobs").unwrap().unwrap();
//! assert_eq!(delivery.message.payload().as_text(), Some("hello"));
//! channel.ack(delivery.delivery_tag).unwrap();
//! ```

mod definition;
mod dsn;
mod memory;
mod registry;
mod traits;

#[cfg(test)]
mod tests;

pub use definition::{Arguments, Binding, ExchangeDefinition, ExchangeKind, QueueDefinition};
pub use dsn::{Dsn, DsnOption, DEFAULT_HOST, DEFAULT_VHOST};
pub use memory::{MemoryBroker, MemoryChannel, MemoryDriver, MemoryTransport, IDLE_TICK};
pub use registry::{DriverRegistry, MEMORY_SCHEME};
pub use traits::{Channel, ConsumeCallback, Delivery, Driver, Transport};
