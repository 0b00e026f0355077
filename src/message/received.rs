//! Messages delivered by a broker, with at-most-one answer semantics

use crate::error::{Error, Result};
use crate::message::{Headers, Message, Options, Payload};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sink for acknowledgements of delivered messages
///
/// Implemented by broker channels; a received message holds one so it can be
/// answered from anywhere in a handler without access to the queue.
pub trait Acknowledger: Send + Sync {
    fn ack(&self, delivery_tag: u64) -> Result<()>;

    fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<()>;
}

/// Broker-side attributes of a delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryInfo {
    pub delivery_tag: u64,
    pub queue: String,
    pub routing_key: String,
    pub exchange: String,
    pub redelivered: bool,
}

/// A message received from a queue
///
/// Clones share the answered bit, so whichever clone answers first wins and
/// every later `ack`/`nack` fails with `AlreadyAnswered`.
#[derive(Clone)]
pub struct ReceivedMessage {
    message: Message,
    delivery: DeliveryInfo,
    answered: Arc<AtomicBool>,
    acknowledger: Arc<dyn Acknowledger>,
}

impl ReceivedMessage {
    pub fn new(message: Message, delivery: DeliveryInfo, acknowledger: Arc<dyn Acknowledger>) -> Self {
        Self {
            message,
            delivery,
            answered: Arc::new(AtomicBool::new(false)),
            acknowledger,
        }
    }

    pub fn ack(&self) -> Result<()> {
        self.answer(|acknowledger, tag| acknowledger.ack(tag))
    }

    pub fn nack(&self, requeue: bool) -> Result<()> {
        self.answer(|acknowledger, tag| acknowledger.nack(tag, requeue))
    }

    fn answer<F>(&self, send: F) -> Result<()>
    where
        F: FnOnce(&dyn Acknowledger, u64) -> Result<()>,
    {
        let tag = self.delivery.delivery_tag;
        if self
            .answered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyAnswered { delivery_tag: tag });
        }

        if let Err(e) = send(self.acknowledger.as_ref(), tag) {
            self.answered.store(false, Ordering::Release);
            return Err(e);
        }
        Ok(())
    }

    pub fn is_answered(&self) -> bool {
        self.answered.load(Ordering::Acquire)
    }

    /// Published through the default exchange straight to this queue
    pub fn is_direct_published(&self) -> bool {
        self.delivery.exchange.is_empty() && self.delivery.routing_key == self.delivery.queue
    }

    /// Replace the message body while keeping delivery identity and answer state
    pub fn with_message(&self, message: Message) -> Self {
        Self {
            message,
            delivery: self.delivery.clone(),
            answered: Arc::clone(&self.answered),
            acknowledger: Arc::clone(&self.acknowledger),
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn payload(&self) -> &Payload {
        self.message.payload()
    }

    pub fn headers(&self) -> &Headers {
        self.message.headers()
    }

    pub fn options(&self) -> &Options {
        self.message.options()
    }

    pub fn delivery(&self) -> &DeliveryInfo {
        &self.delivery
    }

    pub fn delivery_tag(&self) -> u64 {
        self.delivery.delivery_tag
    }

    pub fn queue(&self) -> &str {
        &self.delivery.queue
    }

    pub fn routing_key(&self) -> &str {
        &self.delivery.routing_key
    }

    pub fn exchange(&self) -> &str {
        &self.delivery.exchange
    }

    pub fn is_redelivered(&self) -> bool {
        self.delivery.redelivered
    }
}

impl fmt::Debug for ReceivedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceivedMessage")
            .field("message", &self.message)
            .field("delivery", &self.delivery)
            .field("answered", &self.is_answered())
            .finish()
    }
}
