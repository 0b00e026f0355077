//! Wiring configured connections, topology and consumers

use crate::config::{ConsumerMode, ConsumerSettings, RuntimeConfig};
use crate::connection::{self, ChannelFactory, Connection, QueueFactory};
use crate::consumer::{
    Consumer, LoopConsumer, RoundRobinConsumer, SingleConsumer, SpoolConsumer,
};
use crate::error::{Error, Result};
use crate::handler::{DumpHandler, MessageHandler};
use crate::middleware::{LoggingMiddleware, StopAfterNExecutes};
use crate::transport::DriverRegistry;
use log::{debug, info};
use std::sync::Arc;

/// Per-run overrides from the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub read_timeout: Option<f64>,
    pub looping: bool,
    pub messages: Option<usize>,
}

pub struct Runtime {
    config: RuntimeConfig,
    registry: DriverRegistry,
    handler: Arc<dyn MessageHandler>,
}

impl Runtime {
    /// Runtime whose consumers dump messages to stdout
    pub fn new(config: RuntimeConfig, registry: DriverRegistry) -> Self {
        Self::with_handler(config, registry, Arc::new(DumpHandler::stdout()))
    }

    pub fn with_handler(config: RuntimeConfig, registry: DriverRegistry, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            config,
            registry,
            handler,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    fn open(&self, connection_name: &str) -> Result<Arc<dyn Connection>> {
        connection::open(&self.registry, &self.config.dsn(connection_name)?)
    }

    /// Declare exchanges and bindings; returns how many were declared
    pub fn initialize_exchanges(&self, connection_name: &str) -> Result<usize> {
        let connection = self.open(connection_name)?;
        let channel = connection.open_channel()?;
        let declared = self.config.topology().declare_exchanges(channel.as_ref())?;
        connection.disconnect()?;
        Ok(declared)
    }

    /// Declare queues and bindings; returns how many were declared
    pub fn initialize_queues(&self, connection_name: &str) -> Result<usize> {
        let connection = self.open(connection_name)?;
        let channel = connection.open_channel()?;
        let declared = self.config.topology().declare_queues(channel.as_ref())?;
        connection.disconnect()?;
        Ok(declared)
    }

    /// Build the consumer configured under `key`
    pub fn consumer(&self, key: &str, options: &RunOptions) -> Result<Box<dyn Consumer>> {
        let mut settings = self.config.consumer(key)?.clone();
        if let Some(read_timeout) = options.read_timeout {
            if read_timeout < 0.0 {
                return Err(Error::configuration("read timeout must not be negative"));
            }
            settings.read_timeout = read_timeout;
        }
        if options.looping && settings.mode == ConsumerMode::Single {
            settings.mode = ConsumerMode::Loop;
        }
        debug!("building {} consumer '{}' on queue '{}'", settings.mode, key, settings.queue);

        let mut consumer = self.build(&settings)?;
        if let Some(limit) = options.messages.or(settings.messages) {
            if let Some(pushable) = consumer.as_middleware_pushable() {
                pushable.push_middleware(Arc::new(StopAfterNExecutes::new(limit)));
            }
        }
        Ok(consumer)
    }

    fn build(&self, settings: &ConsumerSettings) -> Result<Box<dyn Consumer>> {
        let connection = self.open(&settings.connection)?;
        if !settings.read_timeout().is_zero() {
            connection.set_read_timeout(settings.read_timeout());
        }
        let queues = QueueFactory::with_definitions(ChannelFactory::new(connection), self.config.queues.clone());
        let handler = Arc::clone(&self.handler);
        let logging = Arc::new(LoggingMiddleware);

        Ok(match settings.mode {
            ConsumerMode::Single => Box::new(
                SingleConsumer::new(queues, settings.queue.clone(), handler, settings.configuration())
                    .with_middleware(logging),
            ),
            ConsumerMode::Loop => Box::new(
                LoopConsumer::new(queues, settings.queue.clone(), handler, settings.loop_configuration())
                    .with_middleware(logging),
            ),
            ConsumerMode::Spool => Box::new(
                SpoolConsumer::new(queues, settings.queue.clone(), handler, settings.spool_configuration()?)?
                    .with_middleware(logging),
            ),
        })
    }

    /// Rotation over the consumers named in the round_robin section
    pub fn round_robin_consumer(&self) -> Result<RoundRobinConsumer> {
        let settings = &self.config.round_robin;
        if settings.consumers.is_empty() {
            return Err(Error::configuration("round_robin section names no consumers"));
        }

        let consumers = settings
            .consumers
            .iter()
            .map(|key| {
                let consumer = self.config.consumer(key)?;
                self.build(consumer)
            })
            .collect::<Result<Vec<_>>>()?;
        info!("rotating over {} consumers", consumers.len());
        RoundRobinConsumer::new(consumers, settings.configuration())
    }
}
