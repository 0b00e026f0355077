//! Cached channel, queue and exchange handles
//!
//! Each factory registers itself as an observer of the connection and drops
//! its cache on any lifecycle event, so the next lookup opens fresh objects
//! on the new link.

use crate::connection::{Connection, ConnectionEvent, ConnectionObserver, Exchange, Queue};
use crate::core::sync::lock;
use crate::error::Result;
use crate::transport::{Channel, QueueDefinition};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

fn observe<T: ConnectionObserver + 'static>(connection: &Arc<dyn Connection>, observer: &Arc<T>) {
    let weak: Weak<dyn ConnectionObserver> = Arc::downgrade(observer) as Weak<dyn ConnectionObserver>;
    connection.attach(weak);
}

pub struct ChannelFactory {
    connection: Arc<dyn Connection>,
    channel: Mutex<Option<Arc<dyn Channel>>>,
}

impl ChannelFactory {
    pub fn new(connection: Arc<dyn Connection>) -> Arc<Self> {
        let factory = Arc::new(Self {
            connection: Arc::clone(&connection),
            channel: Mutex::new(None),
        });
        observe(&connection, &factory);
        factory
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// The cached channel, opening a new one when none is cached or it closed
    pub fn channel(&self) -> Result<Arc<dyn Channel>> {
        if let Some(channel) = lock(&self.channel)?.as_ref() {
            if channel.is_open() {
                return Ok(Arc::clone(channel));
            }
        }

        // opening may notify this factory, so the cache lock is not held here
        let channel = self.connection.open_channel()?;
        *lock(&self.channel)? = Some(Arc::clone(&channel));
        Ok(channel)
    }
}

impl ConnectionObserver for ChannelFactory {
    fn on_connection_event(&self, event: ConnectionEvent) {
        debug!("channel cache dropped on {:?}", event);
        self.channel.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

pub struct QueueFactory {
    channels: Arc<ChannelFactory>,
    definitions: HashMap<String, QueueDefinition>,
    queues: Mutex<HashMap<String, Arc<Queue>>>,
}

impl QueueFactory {
    pub fn new(channels: Arc<ChannelFactory>) -> Arc<Self> {
        Self::with_definitions(channels, Vec::new())
    }

    /// Factory that hands out queues carrying their configured definitions
    pub fn with_definitions(channels: Arc<ChannelFactory>, definitions: Vec<QueueDefinition>) -> Arc<Self> {
        let connection = Arc::clone(channels.connection());
        let factory = Arc::new(Self {
            channels,
            definitions: definitions
                .into_iter()
                .map(|definition| (definition.name.clone(), definition))
                .collect(),
            queues: Mutex::new(HashMap::new()),
        });
        observe(&connection, &factory);
        factory
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        self.channels.connection()
    }

    pub fn queue(&self, name: &str) -> Result<Arc<Queue>> {
        if let Some(queue) = lock(&self.queues)?.get(name) {
            if queue.channel().is_open() {
                return Ok(Arc::clone(queue));
            }
        }

        let definition = self
            .definitions
            .get(name)
            .cloned()
            .unwrap_or_else(|| QueueDefinition::new(name));
        let queue = Arc::new(Queue::new(self.channels.channel()?, definition));
        lock(&self.queues)?.insert(name.to_string(), Arc::clone(&queue));
        Ok(queue)
    }
}

impl ConnectionObserver for QueueFactory {
    fn on_connection_event(&self, _event: ConnectionEvent) {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

pub struct ExchangeFactory {
    channels: Arc<ChannelFactory>,
    exchanges: Mutex<HashMap<String, Arc<Exchange>>>,
}

impl ExchangeFactory {
    pub fn new(channels: Arc<ChannelFactory>) -> Arc<Self> {
        let connection = Arc::clone(channels.connection());
        let factory = Arc::new(Self {
            channels,
            exchanges: Mutex::new(HashMap::new()),
        });
        observe(&connection, &factory);
        factory
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        self.channels.connection()
    }

    /// Exchange handle by name, the empty name is the default exchange
    pub fn exchange(&self, name: &str) -> Result<Arc<Exchange>> {
        if let Some(exchange) = lock(&self.exchanges)?.get(name) {
            if exchange.channel().is_open() {
                return Ok(Arc::clone(exchange));
            }
        }

        let exchange = Arc::new(Exchange::new(name, self.channels.channel()?));
        lock(&self.exchanges)?.insert(name.to_string(), Arc::clone(&exchange));
        Ok(exchange)
    }
}

impl ConnectionObserver for ExchangeFactory {
    fn on_connection_event(&self, _event: ConnectionEvent) {
        self.exchanges.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
