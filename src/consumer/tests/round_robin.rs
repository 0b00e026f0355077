//! RoundRobinConsumer tests

#[cfg(test)]
mod tests {
    use super::super::helpers::{Fixture, Recorder};
    use crate::connection::Connection;
    use crate::consumer::{
        ConsumeOutcome, Consumer, ConsumerConfiguration, LoopConsumer, LoopConsumerConfiguration,
        RoundRobinConsumer, RoundRobinConsumerConfiguration,
    };
    use crate::core::shutdown::StopSignal;
    use crate::error::{Error, Result};
    use crate::handler::MessageHandler;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn child(fixture: &Fixture, queue: &str, handler: Arc<dyn MessageHandler>) -> Box<dyn Consumer> {
        Box::new(LoopConsumer::new(
            Arc::clone(&fixture.queues),
            queue,
            handler,
            LoopConsumerConfiguration::new(ConsumerConfiguration::default(), Duration::ZERO),
        ))
    }

    fn rotation(per_turn_ms: u64, overall_ms: u64) -> RoundRobinConsumerConfiguration {
        RoundRobinConsumerConfiguration::new(1, Duration::from_millis(per_turn_ms), Duration::from_millis(overall_ms))
    }

    #[test]
    fn test_visits_queues_in_strict_alternation() {
        let first = Fixture::new(&["q1"]);
        let second = Fixture::on_broker(Arc::clone(&first.broker), &["q2"]);
        first.publish("q1", &["q1-m1", "q1-m2"]);
        second.publish("q2", &["q2-m1", "q2-m2"]);
        let recorder = Arc::new(Recorder::default());

        let mut consumer = RoundRobinConsumer::new(
            vec![child(&first, "q1", recorder.clone()), child(&second, "q2", recorder.clone())],
            rotation(100, 600),
        )
        .unwrap();

        assert!(matches!(consumer.run(), Err(Error::ConsumerTimeoutExceed { .. })));
        assert_eq!(recorder.seen(), vec!["q1-m1", "q2-m1", "q1-m2", "q2-m2"]);
        assert_eq!(first.ready("q1"), 0);
        assert_eq!(second.ready("q2"), 0);
        assert_eq!(first.unacked(), 0);
    }

    #[test]
    fn test_turns_are_bounded_by_message_count() {
        let first = Fixture::new(&["q1"]);
        let second = Fixture::on_broker(Arc::clone(&first.broker), &["q2"]);
        first.publish("q1", &["a1", "a2", "a3"]);
        second.publish("q2", &["b1"]);
        let recorder = Arc::new(Recorder::default());

        let mut consumer = RoundRobinConsumer::new(
            vec![child(&first, "q1", recorder.clone()), child(&second, "q2", recorder.clone())],
            RoundRobinConsumerConfiguration::new(2, Duration::from_millis(100), Duration::from_millis(400)),
        )
        .unwrap();

        assert!(consumer.run().unwrap_err().is_timeout());
        assert_eq!(recorder.seen(), vec!["a1", "a2", "b1", "a3"]);
    }

    #[test]
    fn test_hook_sees_each_turn_and_stop_is_observed() {
        let fixture = Fixture::new(&["q1", "q2"]);
        let recorder = Arc::new(Recorder::default());
        let turns = Arc::new(Mutex::new(Vec::new()));

        let consumer = RoundRobinConsumer::new(
            vec![child(&fixture, "q1", recorder.clone()), child(&fixture, "q2", recorder.clone())],
            rotation(50, 0),
        )
        .unwrap();
        let stop = consumer.stop_signal();
        let seen_turns = Arc::clone(&turns);
        let mut consumer = consumer.on_consumer_change(move |index| {
            let mut turns = seen_turns.lock().unwrap();
            turns.push(index);
            if turns.len() == 3 {
                stop.request();
            }
        });

        assert_eq!(consumer.run().unwrap(), ConsumeOutcome::Stopped);
        assert_eq!(*turns.lock().unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn test_stop_reaches_children() {
        let fixture = Fixture::new(&["q1"]);
        let only = child(&fixture, "q1", Arc::new(Recorder::default()));
        let child_stop = only.stop_signal();
        let mut consumer = RoundRobinConsumer::new(vec![only], rotation(50, 0)).unwrap();

        consumer.stop();
        assert!(child_stop.is_requested());
        assert_eq!(consumer.run().unwrap(), ConsumeOutcome::Stopped);
    }

    struct Opaque {
        connection: Arc<dyn Connection>,
        stop: StopSignal,
    }

    impl Consumer for Opaque {
        fn run(&mut self) -> Result<ConsumeOutcome> {
            Ok(ConsumeOutcome::Stopped)
        }

        fn stop_signal(&self) -> StopSignal {
            self.stop.clone()
        }

        fn connection(&self) -> Arc<dyn Connection> {
            Arc::clone(&self.connection)
        }
    }

    #[test]
    fn test_children_must_accept_middleware() {
        let fixture = Fixture::new(&["q1"]);
        let opaque: Box<dyn Consumer> = Box::new(Opaque {
            connection: Arc::clone(&fixture.connection),
            stop: StopSignal::new(),
        });
        let mut consumer = RoundRobinConsumer::new(
            vec![child(&fixture, "q1", Arc::new(Recorder::default())), opaque],
            rotation(50, 0),
        )
        .unwrap();

        assert!(matches!(consumer.run(), Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_requires_at_least_one_consumer() {
        assert!(matches!(
            RoundRobinConsumer::new(Vec::new(), RoundRobinConsumerConfiguration::default()),
            Err(Error::Configuration { .. })
        ));
    }
}
