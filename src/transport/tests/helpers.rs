//! Shared fixtures for transport tests

use crate::transport::{Channel, Driver, Dsn, MemoryBroker, MemoryDriver, QueueDefinition, Transport};
use std::sync::Arc;

pub fn connected(broker: &Arc<MemoryBroker>, dsn: &str) -> Box<dyn Transport> {
    let transport = MemoryDriver::new(Arc::clone(broker))
        .create_transport(&Dsn::parse(dsn).unwrap())
        .unwrap();
    transport.connect().unwrap();
    transport
}

pub fn channel_with_queues(queues: &[&str]) -> (Arc<MemoryBroker>, Box<dyn Transport>, Arc<dyn Channel>) {
    let broker = Arc::new(MemoryBroker::new());
    let transport = connected(&broker, "memory://localhost");
    let channel = transport.open_channel().unwrap();
    for queue in queues {
        channel.declare_queue(&QueueDefinition::new(*queue), false).unwrap();
    }
    (broker, transport, channel)
}

pub fn drain_texts(channel: &Arc<dyn Channel>, queue: &str) -> Vec<String> {
    let mut texts = Vec::new();
    while let Some(delivery) = channel.get(queue).unwrap() {
        texts.push(delivery.message.payload().as_text().unwrap_or_default().to_string());
        channel.ack(delivery.delivery_tag).unwrap();
    }
    texts
}
