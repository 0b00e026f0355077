//! Factory cache invalidation on connection events

#[cfg(test)]
mod tests {
    use crate::connection::{self, ChannelFactory, Connection, ExchangeFactory, QueueFactory};
    use crate::message::Message;
    use crate::transport::{DriverRegistry, Dsn, MemoryBroker};
    use std::sync::Arc;

    fn open(broker: &Arc<MemoryBroker>, dsn: &str) -> Arc<dyn Connection> {
        let registry = DriverRegistry::with_memory(Arc::clone(broker));
        connection::open(&registry, &Dsn::parse(dsn).unwrap()).unwrap()
    }

    #[test]
    fn test_channel_cached_until_reconnect() {
        let broker = Arc::new(MemoryBroker::new());
        let connection = open(&broker, "memory://localhost");
        let channels = ChannelFactory::new(Arc::clone(&connection));

        let first = channels.channel().unwrap();
        let again = channels.channel().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        connection.reconnect().unwrap();
        assert!(!first.is_open());
        let fresh = channels.channel().unwrap();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert!(fresh.is_open());
    }

    #[test]
    fn test_queue_and_exchange_handles_follow_reconnect() {
        let broker = Arc::new(MemoryBroker::new());
        let connection = open(&broker, "memory://localhost");
        let channels = ChannelFactory::new(Arc::clone(&connection));
        let queues = QueueFactory::new(Arc::clone(&channels));
        let exchanges = ExchangeFactory::new(channels);

        let queue = queues.queue("jobs").unwrap();
        queue.declare().unwrap();
        let default_exchange = exchanges.exchange("").unwrap();

        connection.disconnect().unwrap();

        let queue_after = queues.queue("jobs").unwrap();
        assert!(!Arc::ptr_eq(&queue, &queue_after));
        let exchange_after = exchanges.exchange("").unwrap();
        assert!(!Arc::ptr_eq(&default_exchange, &exchange_after));

        exchange_after.publish(&Message::new("after"), "jobs").unwrap();
        assert_eq!(queue_after.count().unwrap(), 1);
    }

    #[test]
    fn test_spool_failover_invalidates_factories() {
        let broker = Arc::new(MemoryBroker::new());
        let connection = open(&broker, "memory://a,b");
        let queues = QueueFactory::new(ChannelFactory::new(Arc::clone(&connection)));

        let before = queues.queue("jobs").unwrap();
        broker.set_host_down("a", true).unwrap();
        connection.reconnect().unwrap();

        let after = queues.queue("jobs").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.channel().is_open());
        assert_eq!(connection.endpoint(), "b:0");
    }
}
