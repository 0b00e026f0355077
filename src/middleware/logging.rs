//! Debug logging of every message passing through a pipeline

use crate::error::Result;
use crate::message::{Message, ReceivedMessage};
use crate::middleware::{ConsumerMiddleware, ConsumerNext, Flow, PublisherMiddleware, PublisherNext};
use log::{debug, warn};

/// Logs inbound and outbound messages, works in either pipeline
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware;

impl ConsumerMiddleware for LoggingMiddleware {
    fn handle(&self, message: ReceivedMessage, next: &ConsumerNext) -> Result<Flow> {
        let tag = message.delivery_tag();
        let queue = message.queue().to_string();
        debug!(
            "received #{} from '{}' (routing key '{}', {} bytes{})",
            tag,
            queue,
            message.routing_key(),
            message.payload().len(),
            if message.is_redelivered() { ", redelivered" } else { "" }
        );
        let result = next(message);
        if let Err(e) = &result {
            warn!("message #{} from '{}' failed: {}", tag, queue, e);
        }
        result
    }
}

impl PublisherMiddleware for LoggingMiddleware {
    fn handle(&self, message: Message, next: &PublisherNext, routing_key: &str) -> Result<()> {
        debug!(
            "publishing {} bytes with routing key '{}'",
            message.payload().len(),
            routing_key
        );
        next(message, routing_key)
    }
}
