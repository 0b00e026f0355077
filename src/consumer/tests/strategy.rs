//! Consume strategy tests

#[cfg(test)]
mod tests {
    use super::super::helpers::{text, Fixture};
    use crate::consumer::{ConsumeStrategy, DefaultConsumeStrategy, LoopConsumeStrategy};
    use crate::error::{Error, Result};
    use crate::message::ReceivedMessage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_push_strategy_forwards_idle_ticks_until_stopped() {
        let fixture = Fixture::new(&["jobs"]);
        fixture.publish("jobs", &["a"]);
        let queue = fixture.queues.queue("jobs").unwrap();
        let strategy = DefaultConsumeStrategy::new();

        let mut seen = Vec::new();
        let mut ticks = 0;
        strategy
            .consume(&queue, "tag-1", &mut |message: Option<ReceivedMessage>| -> Result<bool> {
                match message {
                    Some(message) => {
                        seen.push(text(&message));
                        message.ack()?;
                    }
                    None => {
                        ticks += 1;
                        if ticks == 3 {
                            strategy.stop_consume();
                        }
                    }
                }
                Ok(true)
            })
            .unwrap();

        assert_eq!(seen, vec!["a"]);
        assert_eq!(ticks, 3);
        assert!(strategy.stop_signal().is_requested());
    }

    #[test]
    fn test_polling_strategy_times_out_when_idle() {
        let fixture = Fixture::new(&["jobs"]);
        fixture.set_read_timeout(100);
        let queue = fixture.queues.queue("jobs").unwrap();
        let strategy = LoopConsumeStrategy::new(Duration::from_millis(20));

        let mut ticks = 0;
        let result = strategy.consume(&queue, "unused", &mut |message: Option<ReceivedMessage>| -> Result<bool> {
            assert!(message.is_none());
            ticks += 1;
            Ok(true)
        });

        assert!(matches!(result, Err(Error::ConsumerTimeoutExceed { .. })));
        assert!(ticks >= 4);
    }

    #[test]
    fn test_polling_strategy_resets_idle_time_on_delivery() {
        let fixture = Fixture::new(&["jobs"]);
        fixture.set_read_timeout(100);
        let queue = fixture.queues.queue("jobs").unwrap();
        let strategy = LoopConsumeStrategy::new(Duration::from_millis(20));

        let mut idle = 0;
        let mut seen = Vec::new();
        let result = strategy.consume(&queue, "unused", &mut |message: Option<ReceivedMessage>| -> Result<bool> {
            match message {
                Some(message) => {
                    seen.push(text(&message));
                    message.ack()?;
                }
                None => {
                    idle += 1;
                    // arrives after most of the read timeout has passed
                    if idle == 4 && seen.is_empty() {
                        fixture.publish("jobs", &["late"]);
                    }
                }
            }
            Ok(true)
        });

        assert!(result.unwrap_err().is_timeout());
        assert_eq!(seen, vec!["late"]);
        assert!(idle >= 8);
    }

    #[test]
    fn test_polling_strategy_fires_tick_hook() {
        let fixture = Fixture::new(&["jobs"]);
        fixture.set_read_timeout(1_300);
        let queue = fixture.queues.queue("jobs").unwrap();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let strategy = LoopConsumeStrategy::new(Duration::from_millis(50)).with_tick(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result = strategy.consume(&queue, "unused", &mut |_message: Option<ReceivedMessage>| -> Result<bool> {
            Ok(true)
        });

        assert!(result.is_err());
        assert!(ticks.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_polling_strategy_stops_on_request() {
        let fixture = Fixture::new(&["jobs"]);
        let queue = fixture.queues.queue("jobs").unwrap();
        let strategy = LoopConsumeStrategy::new(Duration::from_millis(10));

        strategy
            .consume(&queue, "unused", &mut |_message: Option<ReceivedMessage>| -> Result<bool> {
                strategy.stop_consume();
                Ok(true)
            })
            .unwrap();
        assert!(strategy.stop_signal().is_requested());
    }
}
