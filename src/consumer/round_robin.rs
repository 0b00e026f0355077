//! Fair rotation over several consumers

use crate::connection::Connection;
use crate::consumer::{ConsumeOutcome, Consumer, RoundRobinConsumerConfiguration};
use crate::core::shutdown::StopSignal;
use crate::error::{Error, Result};
use crate::middleware::{ConsumerMiddleware, StopAfterNExecutes};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

type ConsumerChangeHook = Box<dyn FnMut(usize)>;

/// Visits its consumers in fixed order, one bounded turn each
///
/// Every child gets a [`StopAfterNExecutes`] limit and is told to surface
/// read timeouts, so a turn ends after `messages_per_consumer` messages or
/// one idle read timeout. After each turn the child's connection is
/// re-established to drop anything left in client buffers.
pub struct RoundRobinConsumer {
    consumers: Vec<Box<dyn Consumer>>,
    configuration: RoundRobinConsumerConfiguration,
    limits: Vec<Arc<StopAfterNExecutes>>,
    on_consumer_change: Option<ConsumerChangeHook>,
    stop: StopSignal,
}

impl RoundRobinConsumer {
    /// Fails when `consumers` is empty
    pub fn new(consumers: Vec<Box<dyn Consumer>>, configuration: RoundRobinConsumerConfiguration) -> Result<Self> {
        if consumers.is_empty() {
            return Err(Error::configuration("round-robin consumer needs at least one consumer"));
        }
        Ok(Self {
            consumers,
            configuration,
            limits: Vec::new(),
            on_consumer_change: None,
            stop: StopSignal::new(),
        })
    }

    /// Called with the child index before each turn
    pub fn on_consumer_change<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize) + 'static,
    {
        self.on_consumer_change = Some(Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    fn prepare(&mut self) -> Result<()> {
        if self.limits.len() == self.consumers.len() {
            return Ok(());
        }
        if let Some(index) = self
            .consumers
            .iter_mut()
            .position(|consumer| consumer.as_middleware_pushable().is_none())
        {
            return Err(Error::configuration(format!("consumer #{index} does not accept middleware")));
        }

        let per_turn = self.configuration.messages_per_consumer();
        for (index, consumer) in self.consumers.iter_mut().enumerate() {
            consumer.surface_timeout(true);
            let pushable = consumer.as_middleware_pushable().ok_or_else(|| {
                Error::configuration(format!("consumer #{index} does not accept middleware"))
            })?;
            let limit = Arc::new(StopAfterNExecutes::new(per_turn));
            let middleware: Arc<dyn ConsumerMiddleware> = limit.clone();
            pushable.push_middleware(middleware);
            self.limits.push(limit);
        }
        debug!("prepared {} consumers with {} message(s) per turn", self.consumers.len(), per_turn);
        Ok(())
    }

    fn take_turn(&mut self, index: usize) -> Result<ConsumeOutcome> {
        if let Some(hook) = self.on_consumer_change.as_mut() {
            hook(index);
        }

        let consumer = &mut self.consumers[index];
        let connection = consumer.connection();
        let per_turn = self.configuration.timeout_per_consumer();
        if !per_turn.is_zero() {
            connection.set_read_timeout(per_turn);
        }

        self.limits[index].reset();
        let outcome = consumer.run()?;
        debug!("consumer #{} finished its turn: {:?}", index, outcome);

        connection.reconnect()?;
        Ok(outcome)
    }
}

impl Consumer for RoundRobinConsumer {
    fn run(&mut self) -> Result<ConsumeOutcome> {
        self.prepare()?;
        let started = Instant::now();
        let overall = self.configuration.overall_timeout();

        loop {
            for index in 0..self.consumers.len() {
                if self.stop.is_requested() {
                    info!("Round-robin consumer stopped");
                    return Ok(ConsumeOutcome::Stopped);
                }
                self.take_turn(index)?;
            }

            if !overall.is_zero() && started.elapsed() >= overall {
                return Err(Error::ConsumerTimeoutExceed { timeout: overall });
            }
        }
    }

    fn stop(&self) {
        self.stop.request();
        for consumer in &self.consumers {
            consumer.stop();
        }
    }

    fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Connection of the first child
    fn connection(&self) -> Arc<dyn Connection> {
        self.consumers[0].connection()
    }
}
