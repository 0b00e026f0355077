//! Message Handlers
//!
//! Application code plugs into consumers through [`MessageHandler`]. Optional
//! capabilities are discovered at runtime, the same way a consumer asks a
//! handler whether it can flush batches ([`FlushableHandler`]) or recover
//! from its own failures ([`CatchableHandler`]).
//!
//! [`MessageHandlerChain`] composes several handlers into one with
//! first-match dispatch, so consumers never care how many handlers exist.

mod chain;
mod dump;
mod function;
mod landfill;

pub use chain::MessageHandlerChain;
pub use dump::DumpHandler;
pub use function::{handler_fn, FnHandler};
pub use landfill::{LandfillHandler, RETRY_COUNT_HEADER, LANDFILL_REASON_HEADER};

use crate::error::{Error, Result};
use crate::message::ReceivedMessage;

pub trait MessageHandler: Send + Sync {
    fn supports(&self, _message: &ReceivedMessage) -> bool {
        true
    }

    /// Process one message
    ///
    /// The handler may answer the message itself; consumers only ack or
    /// nack messages that are still unanswered afterwards.
    fn handle(&self, message: &ReceivedMessage) -> Result<()>;

    fn as_flushable(&self) -> Option<&dyn FlushableHandler> {
        None
    }

    fn as_catchable(&self) -> Option<&dyn CatchableHandler> {
        None
    }
}

/// Batch capability used by the spool consumer
pub trait FlushableHandler: Send + Sync {
    /// Process a buffered batch in delivery order
    ///
    /// May answer any of the messages; the consumer acks the rest on success
    /// and nacks all unanswered ones on failure.
    fn flush(&self, messages: &[ReceivedMessage]) -> Result<()>;
}

/// Recovery hook consulted when handling fails
pub trait CatchableHandler: Send + Sync {
    /// Return `Ok` to treat `error` as handled, or an error to propagate
    fn catch_error(&self, message: &ReceivedMessage, error: Error) -> Result<()>;
}
