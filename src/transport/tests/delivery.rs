//! Consume, prefetch, acknowledgement and transaction tests

#[cfg(test)]
mod tests {
    use super::super::helpers::{channel_with_queues, drain_texts};
    use crate::error::Error;
    use crate::message::{Message, Options};
    use crate::transport::Channel;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn publish_texts(channel: &Arc<dyn Channel>, queue: &str, texts: &[&str]) {
        for text in texts {
            channel.publish("", queue, &Message::new(*text)).unwrap();
        }
    }

    #[test]
    fn test_prefetch_limits_push_consumption() {
        let (_broker, transport, channel) = channel_with_queues(&["jobs"]);
        transport.set_read_timeout(Duration::from_millis(300));
        publish_texts(&channel, "jobs", &["1", "2", "3"]);
        channel.set_prefetch_count(2).unwrap();

        let mut delivered = 0;
        let result = channel.consume("jobs", "ctag", &mut |delivery| {
            if delivery.is_some() {
                delivered += 1;
            }
            Ok(true)
        });

        // nothing acked, so the third delivery is withheld until the read timeout
        assert!(matches!(result, Err(Error::ConsumerTimeoutExceed { .. })));
        assert_eq!(delivered, 2);
        assert_eq!(channel.prefetch_count(), 2);
    }

    #[test]
    fn test_ack_inside_callback_frees_prefetch() {
        let (broker, _transport, channel) = channel_with_queues(&["jobs"]);
        publish_texts(&channel, "jobs", &["1", "2", "3"]);
        channel.set_prefetch_count(1).unwrap();

        let acker = Arc::clone(&channel);
        let mut seen = Vec::new();
        channel
            .consume("jobs", "ctag", &mut |delivery| {
                if let Some(delivery) = delivery {
                    seen.push(delivery.message.payload().as_text().unwrap().to_string());
                    acker.ack(delivery.delivery_tag)?;
                }
                Ok(seen.len() < 3)
            })
            .unwrap();

        assert_eq!(seen, vec!["1", "2", "3"]);
        assert_eq!(broker.unacked_len().unwrap(), 0);
    }

    #[test]
    fn test_idle_ticks_and_timeout() {
        let (_broker, transport, channel) = channel_with_queues(&["empty"]);
        transport.set_read_timeout(Duration::from_millis(250));

        let started = Instant::now();
        let mut ticks = 0;
        let result = channel.consume("empty", "ctag", &mut |delivery| {
            assert!(delivery.is_none());
            ticks += 1;
            Ok(true)
        });

        assert!(matches!(
            result,
            Err(Error::ConsumerTimeoutExceed { timeout }) if timeout == Duration::from_millis(250)
        ));
        assert!(ticks >= 2);
        assert!(started.elapsed() >= Duration::from_millis(250));
    }

    #[test]
    fn test_cancel_ends_consumption_and_frees_tag() {
        let (_broker, _transport, channel) = channel_with_queues(&["jobs"]);
        let canceller = Arc::clone(&channel);

        channel
            .consume("jobs", "ctag", &mut |_| {
                canceller.cancel("ctag")?;
                Ok(true)
            })
            .unwrap();

        // the tag can be reused once the previous consume has returned
        channel.consume("jobs", "ctag", &mut |_| Ok(false)).unwrap();
    }

    #[test]
    fn test_duplicate_consumer_tag_rejected() {
        let (_broker, _transport, channel) = channel_with_queues(&["jobs"]);
        let inner = Arc::clone(&channel);

        let mut nested = None;
        channel
            .consume("jobs", "ctag", &mut |_| {
                nested = Some(inner.consume("jobs", "ctag", &mut |_| Ok(false)));
                Ok(false)
            })
            .unwrap();
        assert!(matches!(nested, Some(Err(Error::Channel { .. }))));
    }

    #[test]
    fn test_nack_requeue_and_reject() {
        let (broker, _transport, channel) = channel_with_queues(&["jobs"]);
        publish_texts(&channel, "jobs", &["retry", "drop"]);

        let retry = channel.get("jobs").unwrap().unwrap();
        let drop = channel.get("jobs").unwrap().unwrap();
        channel.nack(retry.delivery_tag, true).unwrap();
        channel.nack(drop.delivery_tag, false).unwrap();

        assert_eq!(broker.queue_len("/", "jobs").unwrap(), 1);
        let again = channel.get("jobs").unwrap().unwrap();
        assert!(again.redelivered);
        assert_eq!(again.message.payload().as_text(), Some("retry"));
        assert!(matches!(channel.ack(drop.delivery_tag), Err(Error::Channel { .. })));
    }

    #[test]
    fn test_native_transaction_buffers_publishes() {
        let (_broker, _transport, channel) = channel_with_queues(&["jobs"]);
        assert!(matches!(channel.tx_commit(), Err(Error::Transaction { .. })));

        channel.tx_select().unwrap();
        publish_texts(&channel, "jobs", &["discarded"]);
        channel.tx_rollback().unwrap();
        publish_texts(&channel, "jobs", &["kept"]);
        assert!(channel.get("jobs").unwrap().is_none());

        channel.tx_commit().unwrap();
        assert_eq!(drain_texts(&channel, "jobs"), vec!["kept"]);
    }

    #[test]
    fn test_expired_messages_are_dropped() {
        let (_broker, _transport, channel) = channel_with_queues(&["jobs"]);
        let short_lived = Message::new("stale").with_options(Options::default().with_expiration(1));
        channel.publish("", "jobs", &short_lived).unwrap();
        publish_texts(&channel, "jobs", &["fresh"]);

        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(drain_texts(&channel, "jobs"), vec!["fresh"]);
    }

    #[test]
    fn test_purge_and_count() {
        use crate::transport::QueueDefinition;

        let (_broker, _transport, channel) = channel_with_queues(&["jobs"]);
        publish_texts(&channel, "jobs", &["a", "b", "c"]);

        assert_eq!(channel.declare_queue(&QueueDefinition::new("jobs"), true).unwrap(), 3);
        assert_eq!(channel.purge("jobs").unwrap(), 3);
        assert_eq!(channel.declare_queue(&QueueDefinition::new("jobs"), true).unwrap(), 0);
    }
}
