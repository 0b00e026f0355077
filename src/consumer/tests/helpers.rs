//! Shared fixtures for consumer tests

use crate::connection::{self, ChannelFactory, Connection, ExchangeFactory, QueueFactory};
use crate::error::{Error, Result};
use crate::handler::{FlushableHandler, MessageHandler};
use crate::message::{Message, ReceivedMessage};
use crate::transport::{DriverRegistry, Dsn, MemoryBroker};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct Fixture {
    pub broker: Arc<MemoryBroker>,
    pub connection: Arc<dyn Connection>,
    pub queues: Arc<QueueFactory>,
    pub exchanges: Arc<ExchangeFactory>,
}

impl Fixture {
    pub fn new(queues: &[&str]) -> Self {
        Self::on_broker(Arc::new(MemoryBroker::new()), queues)
    }

    /// Another connection to the same broker
    pub fn on_broker(broker: Arc<MemoryBroker>, queues: &[&str]) -> Self {
        let registry = DriverRegistry::with_memory(Arc::clone(&broker));
        let connection = connection::open(&registry, &Dsn::parse("memory://localhost").unwrap()).unwrap();
        let channels = ChannelFactory::new(Arc::clone(&connection));
        let queue_factory = QueueFactory::new(Arc::clone(&channels));
        for queue in queues {
            queue_factory.queue(queue).unwrap().declare().unwrap();
        }
        Self {
            broker,
            connection,
            queues: queue_factory,
            exchanges: ExchangeFactory::new(channels),
        }
    }

    pub fn publish(&self, queue: &str, texts: &[&str]) {
        let exchange = self.exchanges.exchange("").unwrap();
        for text in texts {
            exchange.publish(&Message::new(*text), queue).unwrap();
        }
    }

    pub fn ready(&self, queue: &str) -> usize {
        self.broker.queue_len("/", queue).unwrap()
    }

    pub fn unacked(&self) -> usize {
        self.broker.unacked_len().unwrap()
    }

    pub fn set_read_timeout(&self, millis: u64) {
        self.connection.set_read_timeout(Duration::from_millis(millis));
    }
}

pub fn text(message: &ReceivedMessage) -> String {
    message.payload().as_text().unwrap_or_default().to_string()
}

/// Records handled bodies and flushed batch sizes; fails on `fail_on`
#[derive(Default)]
pub struct Recorder {
    pub seen: Mutex<Vec<String>>,
    pub batches: Mutex<Vec<usize>>,
    pub fail_on: Option<String>,
    pub fail_flush: bool,
}

impl Recorder {
    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

impl MessageHandler for Recorder {
    fn handle(&self, message: &ReceivedMessage) -> Result<()> {
        let body = text(message);
        self.seen.lock().unwrap().push(body.clone());
        if self.fail_on.as_deref() == Some(body.as_str()) {
            return Err(Error::handler(format!("cannot handle {body}")));
        }
        Ok(())
    }

    fn as_flushable(&self) -> Option<&dyn FlushableHandler> {
        Some(self)
    }
}

impl FlushableHandler for Recorder {
    fn flush(&self, messages: &[ReceivedMessage]) -> Result<()> {
        self.batches.lock().unwrap().push(messages.len());
        if self.fail_flush {
            return Err(Error::handler("flush failed"));
        }
        Ok(())
    }
}
