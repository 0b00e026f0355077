//! Delivery options carried across the transport boundary

use std::time::Duration;

/// AMQP delivery-mode value for messages that survive a broker restart
pub const DELIVERY_MODE_PERSISTENT: u8 = 2;
/// AMQP delivery-mode value for messages kept in memory only
pub const DELIVERY_MODE_TRANSIENT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    persistent: bool,
    /// Expiration in milliseconds, 0 means the message never expires
    expiration: u64,
    priority: Option<u8>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            persistent: true,
            expiration: 0,
            priority: None,
        }
    }
}

impl Options {
    pub fn new(persistent: bool, expiration: u64, priority: Option<u8>) -> Self {
        Self {
            persistent,
            expiration,
            priority,
        }
    }

    /// Rebuild options from wire attributes
    pub fn from_delivery_mode(delivery_mode: u8, expiration: u64, priority: Option<u8>) -> Self {
        Self::new(
            delivery_mode == DELIVERY_MODE_PERSISTENT,
            expiration,
            priority,
        )
    }

    pub fn with_persistent(self, persistent: bool) -> Self {
        Self { persistent, ..self }
    }

    pub fn with_expiration(self, expiration_ms: u64) -> Self {
        Self {
            expiration: expiration_ms,
            ..self
        }
    }

    pub fn with_priority(self, priority: u8) -> Self {
        Self {
            priority: Some(priority),
            ..self
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn delivery_mode(&self) -> u8 {
        if self.persistent {
            DELIVERY_MODE_PERSISTENT
        } else {
            DELIVERY_MODE_TRANSIENT
        }
    }

    pub fn expiration_ms(&self) -> u64 {
        self.expiration
    }

    pub fn expiration(&self) -> Option<Duration> {
        (self.expiration > 0).then(|| Duration::from_millis(self.expiration))
    }

    pub fn priority(&self) -> Option<u8> {
        self.priority
    }
}
