//! Consumers
//!
//! Four ways of draining queues into a [`MessageHandler`]:
//!
//! * [`SingleConsumer`]: one consume call, ends on stop, limit or timeout.
//! * [`LoopConsumer`]: restarts consumption after benign read timeouts.
//! * [`SpoolConsumer`]: buffers messages and hands them to the handler's
//!   `flush` in batches.
//! * [`RoundRobinConsumer`]: rotates over several consumers, bounding every
//!   turn by message count and read timeout.
//!
//! Control flow is reported through [`ConsumeOutcome`], so only real
//! failures come back as errors.
//!
//! ```rust
//! use amqp_runner::connection::{self, ChannelFactory, ExchangeFactory, QueueFactory};
//! use amqp_runner::consumer::{ConsumeOutcome, Consumer, ConsumerConfiguration, SingleConsumer};
//! use amqp_runner::handler::{handler_fn, MessageHandler};
//! use amqp_runner::message::Message;
//! use amqp_runner::middleware::StopAfterNExecutes;
//! use amqp_runner::transport::{DriverRegistry, Dsn, MemoryBroker};
//! use std::sync::Arc;
//!
//! let registry = DriverRegistry::with_memory(Arc::new(MemoryBroker::new()));
//! let connection = connection::open(&registry, &Dsn::parse("memory://localhost").unwrap()).unwrap();
//! let channels = ChannelFactory::new(connection);
//! let queues = QueueFactory::new(Arc::clone(&channels));
//! queues.queue("jobs").unwrap().declare().unwrap();
//! ExchangeFactory::new(channels).exchange("").unwrap().publish(&Message::new("hello"), "jobs").unwrap();
//!
//! let handler: Arc<dyn MessageHandler> = Arc::new(handler_fn(|message| {
//!     assert_eq!(message.payload().as_text(), Some("hello"));
//!     Ok(())
//! }));
//! let mut consumer = SingleConsumer::new(queues, "jobs", handler, ConsumerConfiguration::default())
//!     .with_middleware(Arc::new(StopAfterNExecutes::new(1)));
//!
//! assert_eq!(consumer.run().unwrap(), ConsumeOutcome::LimitReached);
//! ```

mod base;
mod configuration;
mod loop_consumer;
mod round_robin;
mod single;
mod spool;
mod strategy;

#[cfg(test)]
mod tests;

pub use configuration::{
    ConsumerConfiguration, ConsumerTagGenerator, LoopConsumerConfiguration, RandomTagGenerator,
    RoundRobinConsumerConfiguration, SpoolConsumerConfiguration,
};
pub use loop_consumer::LoopConsumer;
pub use round_robin::RoundRobinConsumer;
pub use single::SingleConsumer;
pub use spool::SpoolConsumer;
pub use strategy::{ConsumeStrategy, DefaultConsumeStrategy, LoopConsumeStrategy, DEFAULT_IDLE_DELAY};

use crate::connection::Connection;
use crate::core::shutdown::StopSignal;
use crate::error::Result;
use crate::middleware::ConsumerMiddleware;
use std::sync::Arc;

#[cfg(doc)]
use crate::handler::MessageHandler;

/// How a consumer run ended without failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// `stop()` was observed
    Stopped,
    /// A middleware asked to stop after the current message
    LimitReached,
    /// The read timeout elapsed with no delivery
    TimedOut,
}

pub trait Consumer {
    /// Consume until stopped, limited, timed out or failed
    fn run(&mut self) -> Result<ConsumeOutcome>;

    /// Request a cooperative stop, observed at the next decision point
    fn stop(&self) {
        self.stop_signal().request();
    }

    fn stop_signal(&self) -> StopSignal;

    fn connection(&self) -> Arc<dyn Connection>;

    fn as_middleware_pushable(&mut self) -> Option<&mut dyn MiddlewarePushable> {
        None
    }

    /// Return `TimedOut` instead of restarting after a read timeout
    fn surface_timeout(&mut self, _surface: bool) {}
}

/// Consumers accepting extra middleware after construction
pub trait MiddlewarePushable {
    /// Append `middleware` as the innermost layer
    fn push_middleware(&mut self, middleware: Arc<dyn ConsumerMiddleware>);
}
