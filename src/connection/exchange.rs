//! Exchange handle bound to a channel

use crate::error::Result;
use crate::message::Message;
use crate::transport::{Binding, Channel, ExchangeDefinition};
use log::trace;
use std::sync::Arc;

pub struct Exchange {
    name: String,
    channel: Arc<dyn Channel>,
}

impl Exchange {
    pub fn new(name: impl Into<String>, channel: Arc<dyn Channel>) -> Self {
        Self {
            name: name.into(),
            channel,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    pub fn publish(&self, message: &Message, routing_key: &str) -> Result<()> {
        trace!("publishing to '{}' with key '{}'", self.name, routing_key);
        self.channel.publish(&self.name, routing_key, message)
    }

    pub fn declare(&self, definition: &ExchangeDefinition) -> Result<()> {
        self.channel.declare_exchange(definition)
    }

    /// Bind this exchange as destination of `binding.exchange`
    pub fn bind(&self, binding: &Binding) -> Result<()> {
        self.channel.bind_exchange(&self.name, binding)
    }

    pub fn unbind(&self, binding: &Binding) -> Result<()> {
        self.channel.unbind_exchange(&self.name, binding)
    }
}
