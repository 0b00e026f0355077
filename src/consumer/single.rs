//! One-shot consumption

use crate::connection::{Connection, QueueFactory};
use crate::consumer::base::ConsumerBase;
use crate::consumer::{ConsumeOutcome, ConsumeStrategy, Consumer, ConsumerConfiguration, MiddlewarePushable};
use crate::core::shutdown::StopSignal;
use crate::error::Result;
use crate::handler::MessageHandler;
use crate::message::ReceivedMessage;
use crate::middleware::ConsumerMiddleware;
use log::{debug, info};
use std::sync::Arc;

/// Consumes once; a middleware limit is a clean end of the run
pub struct SingleConsumer {
    base: ConsumerBase,
}

impl SingleConsumer {
    pub fn new(
        queues: Arc<QueueFactory>,
        queue_name: impl Into<String>,
        handler: Arc<dyn MessageHandler>,
        configuration: ConsumerConfiguration,
    ) -> Self {
        Self {
            base: ConsumerBase::new(queues, queue_name.into(), handler, configuration),
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
}

impl Consumer for SingleConsumer {
    fn run(&mut self) -> Result<ConsumeOutcome> {
        let base = &self.base;
        let queue = match base.prepared_queue() {
            Ok(queue) => queue,
            Err(error) => {
                base.disconnect_quietly();
                return Err(error);
            }
        };
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
            Ok(()) if limit_reached => {
                info!("Consumer of '{}' reached its execution limit", queue.name());
                base.connection().disconnect()?;
                Ok(ConsumeOutcome::LimitReached)
            }
            Ok(()) => Ok(ConsumeOutcome::Stopped),
            Err(error) if error.is_timeout() => {
                debug!("consumer of '{}' timed out: {}", queue.name(), error);
                Ok(ConsumeOutcome::TimedOut)
            }
            Err(error) => {
                base.disconnect_quietly();
                Err(error)
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
}

impl MiddlewarePushable for SingleConsumer {
    fn push_middleware(&mut self, middleware: Arc<dyn ConsumerMiddleware>) {
        self.base.push_middleware(middleware);
    }
}
