//! State and acknowledgement rules shared by the queue consumers

use crate::connection::{Connection, Queue, QueueFactory};
use crate::consumer::{ConsumeStrategy, ConsumerConfiguration, DefaultConsumeStrategy};
use crate::error::{Error, Result};
use crate::handler::MessageHandler;
use crate::message::ReceivedMessage;
use crate::middleware::{ConsumerExecutable, ConsumerMiddleware, ConsumerPipeline, Flow};
use log::{debug, warn};
use std::sync::Arc;

pub(crate) struct ConsumerBase {
    queues: Arc<QueueFactory>,
    queue_name: String,
    handler: Arc<dyn MessageHandler>,
    middlewares: ConsumerPipeline,
    executable: ConsumerExecutable,
    configuration: ConsumerConfiguration,
    strategy: Arc<dyn ConsumeStrategy>,
}

fn build_executable(middlewares: &ConsumerPipeline, handler: &Arc<dyn MessageHandler>) -> ConsumerExecutable {
    let handler = Arc::clone(handler);
    let last: ConsumerExecutable = Arc::new(move |message: ReceivedMessage| -> Result<Flow> {
        handler.handle(&message)?;
        Ok(Flow::Continue)
    });
    middlewares.create_executable(last)
}

impl ConsumerBase {
    pub(crate) fn new(
        queues: Arc<QueueFactory>,
        queue_name: String,
        handler: Arc<dyn MessageHandler>,
        configuration: ConsumerConfiguration,
    ) -> Self {
        let middlewares = ConsumerPipeline::new();
        Self {
            executable: build_executable(&middlewares, &handler),
            queues,
            queue_name,
            handler,
            middlewares,
            configuration,
            strategy: Arc::new(DefaultConsumeStrategy::new()),
        }
    }

    pub(crate) fn push_middleware(&mut self, middleware: Arc<dyn ConsumerMiddleware>) {
        self.middlewares.push(middleware);
        self.executable = build_executable(&self.middlewares, &self.handler);
    }

    pub(crate) fn set_strategy(&mut self, strategy: Arc<dyn ConsumeStrategy>) {
        self.strategy = strategy;
    }

    pub(crate) fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub(crate) fn handler(&self) -> &Arc<dyn MessageHandler> {
        &self.handler
    }

    pub(crate) fn configuration(&self) -> &ConsumerConfiguration {
        &self.configuration
    }

    pub(crate) fn strategy(&self) -> &Arc<dyn ConsumeStrategy> {
        &self.strategy
    }

    pub(crate) fn connection(&self) -> Arc<dyn Connection> {
        Arc::clone(self.queues.connection())
    }

    pub(crate) fn is_stop_requested(&self) -> bool {
        self.strategy.stop_signal().is_requested()
    }

    /// The queue on the live channel, with prefetch applied
    pub(crate) fn prepared_queue(&self) -> Result<Arc<Queue>> {
        let queue = self.queues.queue(&self.queue_name)?;
        queue.set_prefetch_count(self.configuration.prefetch_count())?;
        Ok(queue)
    }

    /// Run the pipeline without answering the message
    pub(crate) fn execute(&self, message: ReceivedMessage) -> Result<Flow> {
        (self.executable)(message)
    }

    /// Run the pipeline, then ack or nack the message
    ///
    /// Unanswered messages are acked on success. On failure the handler's
    /// catch hook gets a chance to absorb the error; otherwise the message
    /// is nacked and the error propagates.
    pub(crate) fn process_message(&self, message: ReceivedMessage) -> Result<Flow> {
        match self.execute(message.clone()) {
            Ok(flow) => {
                if !message.is_answered() {
                    message.ack()?;
                }
                Ok(flow)
            }
            Err(error) => {
                self.recover(&message, error)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Offer `error` to the catch hook, acking when it is absorbed
    pub(crate) fn recover(&self, message: &ReceivedMessage, error: Error) -> Result<()> {
        let error = match self.handler.as_catchable() {
            Some(catchable) => match catchable.catch_error(message, error) {
                Ok(()) => {
                    debug!("error on message {} handled by catch hook", message.delivery_tag());
                    if !message.is_answered() {
                        message.ack()?;
                    }
                    return Ok(());
                }
                Err(error) => error,
            },
            None => error,
        };

        self.reject(message);
        Err(error)
    }

    /// Nack an unanswered message per the requeue policy
    pub(crate) fn reject(&self, message: &ReceivedMessage) {
        if message.is_answered() {
            return;
        }
        if let Err(error) = message.nack(self.configuration.requeue_on_error()) {
            warn!("Failed to nack message {}: {}", message.delivery_tag(), error);
        }
    }

    /// Drop the link so client-side protocol state is discarded
    pub(crate) fn disconnect_quietly(&self) {
        if let Err(error) = self.queues.connection().disconnect() {
            warn!("Failed to disconnect after consumer error: {}", error);
        }
    }
}
