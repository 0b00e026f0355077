//! Publishing through a middleware pipeline onto an exchange

use crate::connection::ExchangeFactory;
use crate::error::Result;
use crate::message::Message;
use crate::middleware::{PublisherExecutable, PublisherMiddleware, PublisherPipeline};
use crate::publisher::Publisher;
use std::sync::Arc;

pub struct ExchangePublisher {
    exchanges: Arc<ExchangeFactory>,
    exchange: String,
    middlewares: PublisherPipeline,
    executable: PublisherExecutable,
}

impl ExchangePublisher {
    pub fn new(exchanges: Arc<ExchangeFactory>, exchange: impl Into<String>) -> Self {
        Self::with_middlewares(exchanges, exchange, PublisherPipeline::new())
    }

    pub fn with_middlewares(
        exchanges: Arc<ExchangeFactory>,
        exchange: impl Into<String>,
        middlewares: PublisherPipeline,
    ) -> Self {
        let exchange = exchange.into();
        let executable = Self::build(&exchanges, &exchange, &middlewares);
        Self {
            exchanges,
            exchange,
            middlewares,
            executable,
        }
    }

    fn build(
        exchanges: &Arc<ExchangeFactory>,
        exchange: &str,
        middlewares: &PublisherPipeline,
    ) -> PublisherExecutable {
        let exchanges = Arc::clone(exchanges);
        let exchange = exchange.to_string();
        middlewares.create_executable(Arc::new(move |message: Message, routing_key: &str| -> Result<()> {
            exchanges.exchange(&exchange)?.publish(&message, routing_key)
        }))
    }

    pub fn push_middleware(&mut self, middleware: Arc<dyn PublisherMiddleware>) {
        self.middlewares.push(middleware);
        self.executable = Self::build(&self.exchanges, &self.exchange, &self.middlewares);
    }

    pub fn exchange_name(&self) -> &str {
        &self.exchange
    }

    pub fn exchanges(&self) -> &Arc<ExchangeFactory> {
        &self.exchanges
    }
}

impl Publisher for ExchangePublisher {
    fn publish(&mut self, message: Message, routing_key: &str) -> Result<()> {
        (self.executable)(message, routing_key)
    }
}
