//! Retry-then-landfill recovery for failing handlers

use crate::core::sync::lock;
use crate::error::{Error, Result};
use crate::handler::{CatchableHandler, FlushableHandler, MessageHandler};
use crate::message::ReceivedMessage;
use crate::publisher::Publisher;
use log::warn;
use std::sync::Mutex;

/// Header counting how often a message was sent back for retry
pub const RETRY_COUNT_HEADER: &str = "x-retry-count";
/// Header carrying the last error of a landfilled message
pub const LANDFILL_REASON_HEADER: &str = "x-landfill-reason";

/// Wraps a handler and republishes the messages it fails on
///
/// A failed message is republished to the retry routing key with an
/// incremented `x-retry-count` until `max_retries` is reached, then to the
/// landfill routing key. Either way the failure counts as handled and the
/// original delivery is acked.
pub struct LandfillHandler<H, P> {
    inner: H,
    publisher: Mutex<P>,
    retry_routing_key: String,
    landfill_routing_key: String,
    max_retries: u32,
}

impl<H, P> LandfillHandler<H, P>
where
    H: MessageHandler,
    P: Publisher + Send,
{
    pub fn new(
        inner: H,
        publisher: P,
        retry_routing_key: impl Into<String>,
        landfill_routing_key: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            inner,
            publisher: Mutex::new(publisher),
            retry_routing_key: retry_routing_key.into(),
            landfill_routing_key: landfill_routing_key.into(),
            max_retries,
        }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn into_publisher(self) -> P {
        self.publisher
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn retry_count(message: &ReceivedMessage) -> u32 {
        message
            .headers()
            .find(RETRY_COUNT_HEADER)
            .and_then(|value| value.as_int())
            .and_then(|count| u32::try_from(count).ok())
            .unwrap_or(0)
    }
}

impl<H, P> MessageHandler for LandfillHandler<H, P>
where
    H: MessageHandler,
    P: Publisher + Send,
{
    fn supports(&self, message: &ReceivedMessage) -> bool {
        self.inner.supports(message)
    }

    fn handle(&self, message: &ReceivedMessage) -> Result<()> {
        self.inner.handle(message)
    }

    fn as_flushable(&self) -> Option<&dyn FlushableHandler> {
        self.inner.as_flushable()
    }

    fn as_catchable(&self) -> Option<&dyn CatchableHandler> {
        Some(self)
    }
}

impl<H, P> CatchableHandler for LandfillHandler<H, P>
where
    H: MessageHandler,
    P: Publisher + Send,
{
    fn catch_error(&self, message: &ReceivedMessage, error: Error) -> Result<()> {
        let retries = Self::retry_count(message);
        let mut publisher = lock(&self.publisher)?;

        if retries < self.max_retries {
            warn!(
                "message #{} from '{}' failed ({}), retry {} of {}",
                message.delivery_tag(),
                message.queue(),
                error,
                retries + 1,
                self.max_retries
            );
            let retry = message
                .message()
                .clone()
                .with_header(RETRY_COUNT_HEADER, retries + 1);
            return publisher.publish(retry, &self.retry_routing_key);
        }

        warn!(
            "message #{} from '{}' failed after {} retries, moving to landfill: {}",
            message.delivery_tag(),
            message.queue(),
            retries,
            error
        );
        let landfilled = message
            .message()
            .clone()
            .with_header(LANDFILL_REASON_HEADER, error.to_string());
        publisher.publish(landfilled, &self.landfill_routing_key)
    }
}
