//! Middleware Pipeline
//!
//! Inbound middleware wraps the handling of every [`ReceivedMessage`];
//! outbound middleware wraps every publish. Both are folded once into a
//! single executable by [`MiddlewarePipeline::create_executable`] and reused
//! for every message.
//!
//! Inbound middleware returns a [`Flow`]: `Flow::Stop` asks the consumer to
//! finish after the current message, which is how [`StopAfterNExecutes`]
//! bounds a run without raising an error.

mod logging;
mod pipeline;
mod stop_after;

pub use logging::LoggingMiddleware;
pub use pipeline::{
    ConsumerExecutable, ConsumerNext, ConsumerPipeline, MiddlewarePipeline, PublisherExecutable,
    PublisherNext, PublisherPipeline,
};
pub use stop_after::StopAfterNExecutes;

use crate::error::Result;
use crate::message::{Message, ReceivedMessage};

/// Whether a consumer keeps going after the current message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

impl Flow {
    pub fn is_stop(self) -> bool {
        self == Flow::Stop
    }
}

pub trait ConsumerMiddleware: Send + Sync {
    /// Handle `message`, calling `next` to continue down the stack
    fn handle(&self, message: ReceivedMessage, next: &ConsumerNext) -> Result<Flow>;
}

pub trait PublisherMiddleware: Send + Sync {
    /// Handle `message`, calling `next` to continue down the stack
    fn handle(&self, message: Message, next: &PublisherNext, routing_key: &str) -> Result<()>;
}
