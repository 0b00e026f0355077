//! Long-running consumption that survives idle periods

use crate::connection::{Connection, QueueFactory};
use crate::consumer::base::ConsumerBase;
use crate::consumer::{
    ConsumeOutcome, ConsumeStrategy, Consumer, LoopConsumerConfiguration, MiddlewarePushable,
};
use crate::core::shutdown::StopSignal;
use crate::error::Result;
use crate::handler::MessageHandler;
use crate::message::ReceivedMessage;
use crate::middleware::ConsumerMiddleware;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Restarts consumption whenever the read timeout elapses
///
/// With [`Consumer::surface_timeout`] set the timeout ends the run instead,
/// which is how a round-robin rotation moves to the next queue.
pub struct LoopConsumer {
    base: ConsumerBase,
    read_timeout: Duration,
    surface_timeout: bool,
}

impl LoopConsumer {
    pub fn new(
        queues: Arc<QueueFactory>,
        queue_name: impl Into<String>,
        handler: Arc<dyn MessageHandler>,
        configuration: LoopConsumerConfiguration,
    ) -> Self {
        Self {
            read_timeout: configuration.read_timeout(),
            base: ConsumerBase::new(queues, queue_name.into(), handler, configuration.base().clone()),
            surface_timeout: false,
        }
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn ConsumerMiddleware>) -> Self {
        self.base.push_middleware(middleware);
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ConsumeStrategy>) -> Self {
        self.base.set_strategy(strategy);
        self
    }

    pub fn queue_name(&self) -> &str {
        self.base.queue_name()
    }

    /// Widen the connection read timeout to at least the configured one
    fn widen_read_timeout(&self) {
        let connection = self.base.connection();
        if connection.read_timeout() < self.read_timeout {
            connection.set_read_timeout(self.read_timeout);
        }
    }

    fn consume_once(&self) -> Result<ConsumeOutcome> {
        let base = &self.base;
        let queue = base.prepared_queue()?;
        let tag = base.configuration().generate_tag();
        debug!("consuming '{}' as {}", queue.name(), tag);

        let mut limit_reached = false;
        let result = base.strategy().consume(
            &queue,
            &tag,
            &mut |message: Option<ReceivedMessage>| -> Result<bool> {
                let Some(message) = message else {
                    return Ok(true);
                };
                let flow = base.process_message(message)?;
                limit_reached = flow.is_stop();
                Ok(!limit_reached)
            },
        );

        match result {
            Ok(()) if limit_reached => Ok(ConsumeOutcome::LimitReached),
            Ok(()) => Ok(ConsumeOutcome::Stopped),
            Err(error) if error.is_timeout() => {
                debug!("consumer of '{}' idle: {}", queue.name(), error);
                // the broker may still hold the tag after a client-side timeout
                queue.cancel(&tag)?;
                Ok(ConsumeOutcome::TimedOut)
            }
            Err(error) => Err(error),
        }
    }
}

impl Consumer for LoopConsumer {
    fn run(&mut self) -> Result<ConsumeOutcome> {
        self.widen_read_timeout();

        loop {
            if self.base.is_stop_requested() {
                return Ok(ConsumeOutcome::Stopped);
            }

            match self.consume_once() {
                Ok(ConsumeOutcome::TimedOut) if !self.surface_timeout => continue,
                Ok(ConsumeOutcome::LimitReached) => {
                    info!("Consumer of '{}' reached its execution limit", self.base.queue_name());
                    return Ok(ConsumeOutcome::LimitReached);
                }
                Ok(outcome) => return Ok(outcome),
                Err(error) => {
                    self.base.disconnect_quietly();
                    return Err(error);
                }
            }
        }
    }

    fn stop_signal(&self) -> StopSignal {
        self.base.strategy().stop_signal().clone()
    }

    fn connection(&self) -> Arc<dyn Connection> {
        self.base.connection()
    }

    fn as_middleware_pushable(&mut self) -> Option<&mut dyn MiddlewarePushable> {
        Some(self)
    }

    fn surface_timeout(&mut self, surface: bool) {
        self.surface_timeout = surface;
    }
}

impl MiddlewarePushable for LoopConsumer {
    fn push_middleware(&mut self, middleware: Arc<dyn ConsumerMiddleware>) {
        self.base.push_middleware(middleware);
    }
}
