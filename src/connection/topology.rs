//! Declaring configured exchanges, queues and their bindings

use crate::error::Result;
use crate::transport::{Channel, ExchangeDefinition, QueueDefinition};
use log::info;

#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub exchanges: Vec<ExchangeDefinition>,
    pub queues: Vec<QueueDefinition>,
}

impl Topology {
    pub fn new(exchanges: Vec<ExchangeDefinition>, queues: Vec<QueueDefinition>) -> Self {
        Self { exchanges, queues }
    }

    /// Declare every exchange, then bind each to its sources
    ///
    /// Bindings run after all declarations so definitions may reference each
    /// other in any order. Returns the number of exchanges declared.
    pub fn declare_exchanges(&self, channel: &dyn Channel) -> Result<usize> {
        for exchange in &self.exchanges {
            channel.declare_exchange(exchange)?;
            info!("declared {} exchange '{}'", exchange.kind, exchange.name);
        }
        for exchange in &self.exchanges {
            for binding in &exchange.bindings {
                channel.bind_exchange(&exchange.name, binding)?;
            }
        }
        Ok(self.exchanges.len())
    }

    /// Declare every queue and bind it; source exchanges must already exist
    pub fn declare_queues(&self, channel: &dyn Channel) -> Result<usize> {
        for queue in &self.queues {
            let ready = channel.declare_queue(queue, false)?;
            for binding in &queue.bindings {
                channel.bind_queue(&queue.name, binding)?;
            }
            info!("declared queue '{}' ({} ready)", queue.name, ready);
        }
        Ok(self.queues.len())
    }
}
