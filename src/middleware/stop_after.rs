//! Bounding a consumer run to a number of handled messages

use crate::error::Result;
use crate::message::ReceivedMessage;
use crate::middleware::{ConsumerMiddleware, ConsumerNext, Flow};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Requests a stop once `limit` messages went through successfully
///
/// Failed executions are not counted. The counter resets when the limit is
/// hit, so the same instance bounds every turn of a round-robin rotation.
pub struct StopAfterNExecutes {
    limit: usize,
    executed: AtomicUsize,
}

impl StopAfterNExecutes {
    /// A limit of zero is treated as one
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            executed: AtomicUsize::new(0),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::Acquire)
    }

    /// Forget executions counted so far
    pub fn reset(&self) {
        self.executed.store(0, Ordering::Release);
    }
}

impl ConsumerMiddleware for StopAfterNExecutes {
    fn handle(&self, message: ReceivedMessage, next: &ConsumerNext) -> Result<Flow> {
        let flow = next(message)?;
        let executed = self.executed.fetch_add(1, Ordering::AcqRel) + 1;
        if executed >= self.limit {
            debug!("execution limit of {} reached", self.limit);
            self.executed.store(0, Ordering::Release);
            return Ok(Flow::Stop);
        }
        Ok(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::message::{Acknowledger, DeliveryInfo, Message};
    use std::sync::Arc;

    struct NoopAcknowledger;

    impl Acknowledger for NoopAcknowledger {
        fn ack(&self, _delivery_tag: u64) -> Result<()> {
            Ok(())
        }

        fn nack(&self, _delivery_tag: u64, _requeue: bool) -> Result<()> {
            Ok(())
        }
    }

    fn received(tag: u64) -> ReceivedMessage {
        ReceivedMessage::new(
            Message::new("m"),
            DeliveryInfo {
                delivery_tag: tag,
                queue: "q".to_string(),
                routing_key: "q".to_string(),
                exchange: String::new(),
                redelivered: false,
            },
            Arc::new(NoopAcknowledger),
        )
    }

    #[test]
    fn test_stops_on_limit_and_resets() {
        let middleware = StopAfterNExecutes::new(2);
        let next = |_message: ReceivedMessage| -> Result<Flow> { Ok(Flow::Continue) };

        assert_eq!(middleware.handle(received(1), &next).unwrap(), Flow::Continue);
        assert_eq!(middleware.handle(received(2), &next).unwrap(), Flow::Stop);
        assert_eq!(middleware.executed(), 0);
        assert_eq!(middleware.handle(received(3), &next).unwrap(), Flow::Continue);
    }

    #[test]
    fn test_failures_do_not_count() {
        let middleware = StopAfterNExecutes::new(1);
        let failing = |_message: ReceivedMessage| -> Result<Flow> { Err(Error::handler("boom")) };

        assert!(middleware.handle(received(1), &failing).is_err());
        assert_eq!(middleware.executed(), 0);

        let next = |_message: ReceivedMessage| -> Result<Flow> { Ok(Flow::Continue) };
        assert_eq!(middleware.handle(received(2), &next).unwrap(), Flow::Stop);
    }

    #[test]
    fn test_zero_limit_stops_after_each_message() {
        let middleware = StopAfterNExecutes::new(0);
        assert_eq!(middleware.limit(), 1);
        let next = |_message: ReceivedMessage| -> Result<Flow> { Ok(Flow::Continue) };
        assert_eq!(middleware.handle(received(1), &next).unwrap(), Flow::Stop);
    }
}
