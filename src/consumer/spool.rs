//! Batched consumption through a flushable handler

use crate::connection::{Connection, QueueFactory};
use crate::consumer::base::ConsumerBase;
use crate::consumer::{
    ConsumeOutcome, ConsumeStrategy, Consumer, MiddlewarePushable, SpoolConsumerConfiguration,
};
use crate::core::shutdown::StopSignal;
use crate::error::{Error, Result};
use crate::handler::MessageHandler;
use crate::message::ReceivedMessage;
use crate::middleware::{ConsumerMiddleware, Flow};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Buffers deliveries and flushes them in batches
///
/// A batch is flushed when it reaches the prefetch count or when the flush
/// deadline passes, whichever comes first. The deadline slides: it is
/// recomputed after every flush. The per-message `handle` must leave
/// messages unanswered; the consumer acks whatever `flush` did not answer.
pub struct SpoolConsumer {
    base: ConsumerBase,
    batch_size: usize,
    timeout: Duration,
    read_timeout: Duration,
    surface_timeout: bool,
}

impl SpoolConsumer {
    /// Fails unless the handler can flush and the batch size is positive
    pub fn new(
        queues: Arc<QueueFactory>,
        queue_name: impl Into<String>,
        handler: Arc<dyn MessageHandler>,
        configuration: SpoolConsumerConfiguration,
    ) -> Result<Self> {
        if handler.as_flushable().is_none() {
            return Err(Error::configuration("spool consumer requires a flushable handler"));
        }
        if configuration.batch_size() == 0 {
            return Err(Error::configuration("spool consumer requires a prefetch count above zero"));
        }

        Ok(Self {
            batch_size: configuration.batch_size(),
            timeout: configuration.timeout(),
            read_timeout: configuration.read_timeout(),
            base: ConsumerBase::new(queues, queue_name.into(), handler, configuration.base().clone()),
            surface_timeout: false,
        })
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

    /// Run one message through the pipeline and buffer it
    fn receive(&self, message: ReceivedMessage, buffer: &mut Vec<ReceivedMessage>) -> Result<Flow> {
        match self.base.execute(message.clone()) {
            Ok(flow) => {
                if message.is_answered() {
                    self.reject_all(buffer);
                    return Err(Error::AnsweredByFlushableHandler {
                        delivery_tag: message.delivery_tag(),
                    });
                }
                buffer.push(message);
                Ok(flow)
            }
            Err(error) => match self.base.recover(&message, error) {
                Ok(()) => Ok(Flow::Continue),
                Err(error) => {
                    self.reject_all(buffer);
                    Err(error)
                }
            },
        }
    }

    /// Hand the buffered batch to the handler and answer what it left
    fn flush(&self, buffer: &mut Vec<ReceivedMessage>) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(buffer);
        let flushable = self
            .base
            .handler()
            .as_flushable()
            .ok_or_else(|| Error::configuration("spool consumer requires a flushable handler"))?;

        debug!("flushing {} message(s) from '{}'", batch.len(), self.base.queue_name());
        if let Err(error) = flushable.flush(&batch) {
            for message in &batch {
                self.base.reject(message);
            }
            return Err(error);
        }

        for message in batch.iter().filter(|message| !message.is_answered()) {
            message.ack()?;
        }
        Ok(())
    }

    fn reject_all(&self, buffer: &mut Vec<ReceivedMessage>) {
        for message in buffer.drain(..) {
            self.base.reject(&message);
        }
    }

    fn consume_once(&self, tag: &str, buffer: &mut Vec<ReceivedMessage>) -> Result<ConsumeOutcome> {
        let queue = self.base.prepared_queue()?;
        debug!("spooling '{}' as {}", queue.name(), tag);

        let mut limit_reached = false;
        let mut deadline = Instant::now() + self.timeout;
        let result = self.base.strategy().consume(
            &queue,
            tag,
            &mut |message: Option<ReceivedMessage>| -> Result<bool> {
                if let Some(message) = message {
                    if self.receive(message, buffer)?.is_stop() {
                        limit_reached = true;
                        return Ok(false);
                    }
                }
                if buffer.len() >= self.batch_size || Instant::now() >= deadline {
                    self.flush(buffer)?;
                    deadline = Instant::now() + self.timeout;
                }
                Ok(true)
            },
        );

        match result {
            Ok(()) => {
                self.flush(buffer)?;
                if limit_reached {
                    Ok(ConsumeOutcome::LimitReached)
                } else {
                    Ok(ConsumeOutcome::Stopped)
                }
            }
            Err(error) if error.is_timeout() => {
                debug!("spool of '{}' idle: {}", queue.name(), error);
                self.flush(buffer)?;
                queue.cancel(tag)?;
                Ok(ConsumeOutcome::TimedOut)
            }
            Err(error) => Err(error),
        }
    }
}

impl Consumer for SpoolConsumer {
    fn run(&mut self) -> Result<ConsumeOutcome> {
        let connection = self.base.connection();
        if connection.read_timeout() < self.read_timeout {
            connection.set_read_timeout(self.read_timeout);
        }

        let mut previous_tag: Option<String> = None;
        let mut buffer = Vec::with_capacity(self.batch_size);
        loop {
            if self.base.is_stop_requested() {
                return Ok(ConsumeOutcome::Stopped);
            }

            // a fresh tag per iteration never collides with one still registered
            if let Some(tag) = previous_tag.take() {
                if let Ok(queue) = self.base.prepared_queue() {
                    if let Err(error) = queue.cancel(&tag) {
                        warn!("Failed to cancel consumer tag {}: {}", tag, error);
                    }
                }
            }
            let tag = self.base.configuration().generate_tag();
            previous_tag = Some(tag.clone());

            match self.consume_once(&tag, &mut buffer) {
                Ok(ConsumeOutcome::TimedOut) if !self.surface_timeout => continue,
                Ok(ConsumeOutcome::LimitReached) => {
                    info!("Spool of '{}' reached its execution limit", self.base.queue_name());
                    return Ok(ConsumeOutcome::LimitReached);
                }
                Ok(outcome) => return Ok(outcome),
                Err(error) => {
                    self.reject_all(&mut buffer);
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

impl MiddlewarePushable for SpoolConsumer {
    fn push_middleware(&mut self, middleware: Arc<dyn ConsumerMiddleware>) {
        self.base.push_middleware(middleware);
    }
}
