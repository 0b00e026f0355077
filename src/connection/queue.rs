//! Queue handle bound to a channel

use crate::error::Result;
use crate::message::{Acknowledger, DeliveryInfo, ReceivedMessage};
use crate::transport::{Binding, Channel, Delivery, QueueDefinition};
use std::sync::Arc;
use std::time::Duration;

/// Callback driven by [`Queue::consume`], `None` is an idle tick
pub type ReceiveCallback<'a> = dyn FnMut(Option<ReceivedMessage>) -> Result<bool> + 'a;

/// Lets received messages answer through the channel they arrived on
struct ChannelAcknowledger(Arc<dyn Channel>);

impl Acknowledger for ChannelAcknowledger {
    fn ack(&self, delivery_tag: u64) -> Result<()> {
        self.0.ack(delivery_tag)
    }

    fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<()> {
        self.0.nack(delivery_tag, requeue)
    }
}

pub struct Queue {
    definition: QueueDefinition,
    channel: Arc<dyn Channel>,
    acknowledger: Arc<dyn Acknowledger>,
}

impl Queue {
    pub fn new(channel: Arc<dyn Channel>, definition: QueueDefinition) -> Self {
        Self {
            definition,
            acknowledger: Arc::new(ChannelAcknowledger(Arc::clone(&channel))),
            channel,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &QueueDefinition {
        &self.definition
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    fn received(&self, delivery: Delivery) -> ReceivedMessage {
        ReceivedMessage::new(
            delivery.message,
            DeliveryInfo {
                delivery_tag: delivery.delivery_tag,
                queue: self.definition.name.clone(),
                routing_key: delivery.routing_key,
                exchange: delivery.exchange,
                redelivered: delivery.redelivered,
            },
            Arc::clone(&self.acknowledger),
        )
    }

    /// Blocking consumption under `consumer_tag`
    pub fn consume(&self, consumer_tag: &str, callback: &mut ReceiveCallback<'_>) -> Result<()> {
        self.channel
            .consume(self.name(), consumer_tag, &mut |delivery: Option<Delivery>| {
                callback(delivery.map(|delivery| self.received(delivery)))
            })
    }

    pub fn get(&self) -> Result<Option<ReceivedMessage>> {
        Ok(self.channel.get(self.name())?.map(|delivery| self.received(delivery)))
    }

    pub fn cancel(&self, consumer_tag: &str) -> Result<()> {
        self.channel.cancel(consumer_tag)
    }

    pub fn purge(&self) -> Result<u32> {
        self.channel.purge(self.name())
    }

    /// Ready message count from a passive declare
    pub fn count(&self) -> Result<u32> {
        self.channel.declare_queue(&self.definition, true)
    }

    pub fn declare(&self) -> Result<u32> {
        self.channel.declare_queue(&self.definition, false)
    }

    pub fn bind(&self, binding: &Binding) -> Result<()> {
        self.channel.bind_queue(self.name(), binding)
    }

    pub fn unbind(&self, binding: &Binding) -> Result<()> {
        self.channel.unbind_queue(self.name(), binding)
    }

    pub fn set_prefetch_count(&self, count: u16) -> Result<()> {
        self.channel.set_prefetch_count(count)
    }

    pub fn prefetch_count(&self) -> u16 {
        self.channel.prefetch_count()
    }

    pub fn read_timeout(&self) -> Duration {
        self.channel.read_timeout()
    }
}
