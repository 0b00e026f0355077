//! Scheme to driver lookup

use crate::error::{Error, Result};
use crate::transport::{Driver, Dsn, MemoryBroker, MemoryDriver, Transport};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

pub const MEMORY_SCHEME: &str = "memory";

/// Maps DSN schemes to the drivers that can serve them
///
/// The registry is an explicit value handed to whoever opens connections;
/// wire drivers for `amqp`/`amqps` are registered by the embedding
/// application.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the in-process driver bound to `broker`
    pub fn with_memory(broker: Arc<MemoryBroker>) -> Self {
        let mut registry = Self::new();
        registry.register(MEMORY_SCHEME, Arc::new(MemoryDriver::new(broker)));
        registry
    }

    pub fn register(&mut self, scheme: &str, driver: Arc<dyn Driver>) {
        debug!("registering transport driver for scheme '{}'", scheme);
        self.drivers.insert(scheme.to_ascii_lowercase(), driver);
    }

    pub fn driver(&self, scheme: &str) -> Result<Arc<dyn Driver>> {
        self.drivers
            .get(&scheme.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| Error::UnknownDriver {
                scheme: scheme.to_string(),
            })
    }

    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.drivers.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    pub fn create_transport(&self, dsn: &Dsn) -> Result<Box<dyn Transport>> {
        self.driver(&dsn.scheme)?.create_transport(dsn)
    }
}
