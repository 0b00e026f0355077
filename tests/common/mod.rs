//! Shared fixtures for integration tests
//!
//! Everything runs against one in-process broker per test.

#![allow(dead_code)]

use amqp_runner::connection::{self, ChannelFactory, Connection, ExchangeFactory, QueueFactory};
use amqp_runner::error::{Error, Result};
use amqp_runner::handler::{FlushableHandler, MessageHandler};
use amqp_runner::message::{Message, ReceivedMessage};
use amqp_runner::transport::{DriverRegistry, Dsn, MemoryBroker};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct Broker {
    pub broker: Arc<MemoryBroker>,
    pub registry: DriverRegistry,
}

impl Broker {
    pub fn new() -> Self {
        let broker = Arc::new(MemoryBroker::new());
        Self {
            registry: DriverRegistry::with_memory(Arc::clone(&broker)),
            broker,
        }
    }

    pub fn connect(&self, dsn: &str) -> Arc<dyn Connection> {
        connection::open(&self.registry, &Dsn::parse(dsn).unwrap()).unwrap()
    }

    /// Queue factory on a fresh connection, declaring `queues`
    pub fn queues(&self, queues: &[&str]) -> Arc<QueueFactory> {
        let factory = QueueFactory::new(ChannelFactory::new(self.connect("memory://localhost")));
        for queue in queues {
            factory.queue(queue).unwrap().declare().unwrap();
        }
        factory
    }

    pub fn exchanges(&self) -> Arc<ExchangeFactory> {
        ExchangeFactory::new(ChannelFactory::new(self.connect("memory://localhost")))
    }

    pub fn publish(&self, queue: &str, texts: &[&str]) {
        let exchange = self.exchanges().exchange("").unwrap();
        for text in texts {
            exchange.publish(&Message::new(*text), queue).unwrap();
        }
    }

    pub fn ready(&self, queue: &str) -> usize {
        self.broker.queue_len("/", queue).unwrap()
    }
}

pub fn text(message: &ReceivedMessage) -> String {
    message.payload().as_text().unwrap_or_default().to_string()
}

pub fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Handler recording bodies and batch sizes
#[derive(Default)]
pub struct Collector {
    seen: Mutex<Vec<String>>,
    batches: Mutex<Vec<usize>>,
    fail_on: Option<String>,
}

impl Collector {
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

impl MessageHandler for Collector {
    fn handle(&self, message: &ReceivedMessage) -> Result<()> {
        let body = text(message);
        self.seen.lock().unwrap().push(body.clone());
        match &self.fail_on {
            Some(failing) if *failing == body => Err(Error::handler(format!("rejecting {body}"))),
            _ => Ok(()),
        }
    }

    fn as_flushable(&self) -> Option<&dyn FlushableHandler> {
        Some(self)
    }
}

impl FlushableHandler for Collector {
    fn flush(&self, messages: &[ReceivedMessage]) -> Result<()> {
        self.batches.lock().unwrap().push(messages.len());
        Ok(())
    }
}
