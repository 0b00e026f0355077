//! Begin/commit/rollback over native or savepoint transactions

use crate::connection::ChannelFactory;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::publisher::{Publisher, SavepointPublisher};
use std::sync::Arc;

pub trait Transactional {
    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Number of currently open transactions
    fn depth(&self) -> usize;
}

/// Broker-native transactions on the publishing channel
///
/// Native transactions do not nest: `begin` while one is open fails.
pub struct ChannelTransaction {
    channels: Arc<ChannelFactory>,
    active: bool,
}

impl ChannelTransaction {
    pub fn new(channels: Arc<ChannelFactory>) -> Self {
        Self {
            channels,
            active: false,
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(Error::transaction("no transaction is open"))
        }
    }
}

impl Transactional for ChannelTransaction {
    fn begin(&mut self) -> Result<()> {
        if self.active {
            return Err(Error::transaction("native transactions cannot be nested"));
        }
        self.channels.channel()?.tx_select()?;
        self.active = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.active = false;
        self.channels.channel()?.tx_commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.active = false;
        self.channels.channel()?.tx_rollback()
    }

    fn depth(&self) -> usize {
        usize::from(self.active)
    }
}

/// Nested transactions emulated with savepoints
///
/// Every `begin` opens a uniquely named savepoint. An inner `commit` folds
/// the savepoint into its parent, the outermost `commit` publishes
/// everything, and `rollback` discards the innermost open savepoint.
pub struct SavepointTransaction<P> {
    publisher: SavepointPublisher<P>,
    open: Vec<String>,
    counter: usize,
}

impl<P: Publisher> SavepointTransaction<P> {
    pub fn new(publisher: P) -> Self {
        Self {
            publisher: SavepointPublisher::new(publisher),
            open: Vec::new(),
            counter: 0,
        }
    }

    pub fn publisher(&self) -> &SavepointPublisher<P> {
        &self.publisher
    }

    pub fn into_inner(self) -> P {
        self.publisher.into_inner()
    }

    fn innermost(&mut self) -> Result<String> {
        self.open
            .pop()
            .ok_or_else(|| Error::transaction("no transaction is open"))
    }
}

impl<P: Publisher> Transactional for SavepointTransaction<P> {
    fn begin(&mut self) -> Result<()> {
        self.counter += 1;
        let name = format!("savepoint_{}", self.counter);
        self.publisher.start(&name)?;
        self.open.push(name);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let name = self.innermost()?;
        if self.open.is_empty() {
            self.publisher.flush()
        } else {
            self.publisher.release(&name)
        }
    }

    fn rollback(&mut self) -> Result<()> {
        let name = self.innermost()?;
        self.publisher.rollback(&name)
    }

    fn depth(&self) -> usize {
        self.open.len()
    }
}

impl<P: Publisher> Publisher for SavepointTransaction<P> {
    fn publish(&mut self, message: Message, routing_key: &str) -> Result<()> {
        self.publisher.publish(message, routing_key)
    }
}
