//! Topology declaration tests

#[cfg(test)]
mod tests {
    use crate::connection::{self, ChannelFactory, Topology};
    use crate::message::Message;
    use crate::transport::{
        Binding, DriverRegistry, Dsn, ExchangeDefinition, ExchangeKind, MemoryBroker, QueueDefinition,
    };
    use std::sync::Arc;

    #[test]
    fn test_declares_exchanges_before_bindings() {
        let broker = Arc::new(MemoryBroker::new());
        let registry = DriverRegistry::with_memory(Arc::clone(&broker));
        let connection = connection::open(&registry, &Dsn::parse("memory://localhost").unwrap()).unwrap();
        let channel = ChannelFactory::new(connection).channel().unwrap();

        // "orders" binds to "ingress", which is listed after it
        let topology = Topology::new(
            vec![
                ExchangeDefinition::new("orders", ExchangeKind::Topic)
                    .with_binding(Binding::new("ingress", "order.#")),
                ExchangeDefinition::new("ingress", ExchangeKind::Topic),
            ],
            vec![QueueDefinition::new("created").with_binding(Binding::new("orders", "order.created"))],
        );

        assert_eq!(topology.declare_exchanges(channel.as_ref()).unwrap(), 2);
        assert_eq!(topology.declare_queues(channel.as_ref()).unwrap(), 1);

        channel.publish("ingress", "order.created", &Message::new("o-1")).unwrap();
        channel.publish("ingress", "order.cancelled", &Message::new("o-2")).unwrap();
        assert_eq!(broker.queue_len("/", "created").unwrap(), 1);
    }
}
