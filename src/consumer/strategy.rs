//! How a consumer pulls deliveries off its queue

use crate::connection::{Queue, ReceiveCallback};
use crate::core::shutdown::StopSignal;
use crate::error::{Error, Result};
use crate::message::ReceivedMessage;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

/// Sleep between empty polls of [`LoopConsumeStrategy`]
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(100);

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Drives a consumer callback over one queue
///
/// The callback sees `Some` for each delivery and `None` on idle ticks.
/// Returning `false` ends consumption.
pub trait ConsumeStrategy: Send + Sync {
    fn consume(&self, queue: &Queue, consumer_tag: &str, callback: &mut ReceiveCallback<'_>) -> Result<()>;

    fn stop_signal(&self) -> &StopSignal;

    /// End consumption at the next delivery or idle tick
    fn stop_consume(&self) {
        self.stop_signal().request();
    }
}

/// Blocking push consumption through the channel
#[derive(Debug, Default)]
pub struct DefaultConsumeStrategy {
    stop: StopSignal,
}

impl DefaultConsumeStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stop_signal(stop: StopSignal) -> Self {
        Self { stop }
    }
}

impl ConsumeStrategy for DefaultConsumeStrategy {
    fn consume(&self, queue: &Queue, consumer_tag: &str, callback: &mut ReceiveCallback<'_>) -> Result<()> {
        queue.consume(
            consumer_tag,
            &mut |message: Option<ReceivedMessage>| -> Result<bool> {
                // a delivery already taken is still handled so it gets answered
                if message.is_none() && self.stop.is_requested() {
                    return Ok(false);
                }
                let more = callback(message)?;
                Ok(more && !self.stop.is_requested())
            },
        )
    }

    fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }
}

/// Polls `get` and sleeps while the queue is empty
///
/// Idle time accumulates between deliveries; once it exceeds the channel
/// read timeout consumption fails with `ConsumerTimeoutExceed`, matching the
/// push strategy.
pub struct LoopConsumeStrategy {
    idle_delay: Duration,
    on_tick: Option<Box<dyn Fn() + Send + Sync>>,
    stop: StopSignal,
}

impl LoopConsumeStrategy {
    pub fn new(idle_delay: Duration) -> Self {
        Self {
            idle_delay,
            on_tick: None,
            stop: StopSignal::new(),
        }
    }

    /// Hook fired about once per second while consuming, busy or idle
    pub fn with_tick<F>(self, on_tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            on_tick: Some(Box::new(on_tick)),
            ..self
        }
    }

    pub fn with_stop_signal(self, stop: StopSignal) -> Self {
        Self { stop, ..self }
    }

    pub fn idle_delay(&self) -> Duration {
        self.idle_delay
    }
}

impl Default for LoopConsumeStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_DELAY)
    }
}

impl fmt::Debug for LoopConsumeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopConsumeStrategy")
            .field("idle_delay", &self.idle_delay)
            .field("on_tick", &self.on_tick.is_some())
            .field("stop", &self.stop)
            .finish()
    }
}

impl ConsumeStrategy for LoopConsumeStrategy {
    fn consume(&self, queue: &Queue, _consumer_tag: &str, callback: &mut ReceiveCallback<'_>) -> Result<()> {
        let read_timeout = queue.read_timeout();
        let mut idle = Duration::ZERO;
        let mut last_tick = Instant::now();

        while !self.stop.is_requested() {
            if last_tick.elapsed() >= TICK_INTERVAL {
                if let Some(on_tick) = &self.on_tick {
                    on_tick();
                }
                last_tick = Instant::now();
            }

            if let Some(message) = queue.get()? {
                idle = Duration::ZERO;
                if !callback(Some(message))? {
                    return Ok(());
                }
                continue;
            }

            thread::sleep(self.idle_delay);
            idle += self.idle_delay;
            if !read_timeout.is_zero() && idle > read_timeout {
                return Err(Error::ConsumerTimeoutExceed { timeout: read_timeout });
            }
            if !callback(None)? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }
}
