//! Consumer settings

use crate::error::{Error, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const TAG_SUFFIX_LEN: usize = 12;

/// Produces consumer tags, one per consume call
pub trait ConsumerTagGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `<prefix>-<random alphanumeric>` tags
#[derive(Debug, Clone)]
pub struct RandomTagGenerator {
    prefix: String,
}

impl RandomTagGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for RandomTagGenerator {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

impl ConsumerTagGenerator for RandomTagGenerator {
    fn generate(&self) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TAG_SUFFIX_LEN)
            .map(char::from)
            .collect();
        format!("{}-{}", self.prefix, suffix)
    }
}

#[derive(Clone)]
pub struct ConsumerConfiguration {
    requeue_on_error: bool,
    prefetch_count: u16,
    tag_generator: Arc<dyn ConsumerTagGenerator>,
}

impl ConsumerConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requeue_on_error(self, requeue_on_error: bool) -> Self {
        Self {
            requeue_on_error,
            ..self
        }
    }

    pub fn with_prefetch_count(self, prefetch_count: u16) -> Self {
        Self {
            prefetch_count,
            ..self
        }
    }

    pub fn with_tag_generator(self, tag_generator: Arc<dyn ConsumerTagGenerator>) -> Self {
        Self {
            tag_generator,
            ..self
        }
    }

    pub fn requeue_on_error(&self) -> bool {
        self.requeue_on_error
    }

    pub fn prefetch_count(&self) -> u16 {
        self.prefetch_count
    }

    pub fn generate_tag(&self) -> String {
        self.tag_generator.generate()
    }
}

impl Default for ConsumerConfiguration {
    fn default() -> Self {
        Self {
            requeue_on_error: true,
            prefetch_count: 1,
            tag_generator: Arc::new(RandomTagGenerator::default()),
        }
    }
}

impl fmt::Debug for ConsumerConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerConfiguration")
            .field("requeue_on_error", &self.requeue_on_error)
            .field("prefetch_count", &self.prefetch_count)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoopConsumerConfiguration {
    base: ConsumerConfiguration,
    read_timeout: Duration,
}

impl LoopConsumerConfiguration {
    /// `read_timeout` is the minimum the connection is widened to, zero leaves it alone
    pub fn new(base: ConsumerConfiguration, read_timeout: Duration) -> Self {
        Self { base, read_timeout }
    }

    pub fn base(&self) -> &ConsumerConfiguration {
        &self.base
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

/// Batching settings; the batch size is the base prefetch count
#[derive(Debug, Clone)]
pub struct SpoolConsumerConfiguration {
    base: ConsumerConfiguration,
    timeout: Duration,
    read_timeout: Duration,
}

impl SpoolConsumerConfiguration {
    /// Fails when `timeout` is zero; a zero `read_timeout` defaults to `timeout`
    pub fn new(base: ConsumerConfiguration, timeout: Duration, read_timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::configuration("spool flush timeout must be greater than zero"));
        }
        let read_timeout = if read_timeout.is_zero() { timeout } else { read_timeout };
        Ok(Self {
            base,
            timeout,
            read_timeout,
        })
    }

    pub fn base(&self) -> &ConsumerConfiguration {
        &self.base
    }

    pub fn batch_size(&self) -> usize {
        usize::from(self.base.prefetch_count())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoundRobinConsumerConfiguration {
    messages_per_consumer: usize,
    timeout_per_consumer: Duration,
    overall_timeout: Duration,
}

impl RoundRobinConsumerConfiguration {
    /// A zero `timeout_per_consumer` keeps each child's own read timeout,
    /// a zero `overall_timeout` rotates until stopped
    pub fn new(messages_per_consumer: usize, timeout_per_consumer: Duration, overall_timeout: Duration) -> Self {
        Self {
            messages_per_consumer: messages_per_consumer.max(1),
            timeout_per_consumer,
            overall_timeout,
        }
    }

    pub fn messages_per_consumer(&self) -> usize {
        self.messages_per_consumer
    }

    pub fn timeout_per_consumer(&self) -> Duration {
        self.timeout_per_consumer
    }

    pub fn overall_timeout(&self) -> Duration {
        self.overall_timeout
    }
}

impl Default for RoundRobinConsumerConfiguration {
    fn default() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }
}
