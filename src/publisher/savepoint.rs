//! Nested buffering of publishes under named savepoints

use crate::error::{Error, Result};
use crate::message::Message;
use crate::publisher::Publisher;
use log::debug;

struct Savepoint {
    name: String,
    buffer: Vec<(Message, String)>,
}

/// Buffers publishes into the active savepoint until flushed
///
/// Savepoints form a stack in start order. Rolling one back discards it and
/// every savepoint started after it; releasing one folds its buffer and
/// every later one into the savepoint below it.
pub struct SavepointPublisher<P> {
    inner: P,
    savepoints: Vec<Savepoint>,
    active: Option<usize>,
}

impl<P: Publisher> SavepointPublisher<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            savepoints: Vec::new(),
            active: None,
        }
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.savepoints
            .iter()
            .position(|savepoint| savepoint.name == name)
            .ok_or_else(|| Error::SavepointNotFound {
                name: name.to_string(),
            })
    }

    /// Open a savepoint and make it active
    pub fn start(&mut self, name: &str) -> Result<()> {
        if self.savepoints.iter().any(|savepoint| savepoint.name == name) {
            return Err(Error::SavepointAlreadyExists {
                name: name.to_string(),
            });
        }
        self.savepoints.push(Savepoint {
            name: name.to_string(),
            buffer: Vec::new(),
        });
        self.active = Some(self.savepoints.len() - 1);
        debug!("savepoint '{}' started", name);
        Ok(())
    }

    /// Discard `name` and every savepoint started after it
    pub fn rollback(&mut self, name: &str) -> Result<()> {
        let position = self.position(name)?;
        let discarded: usize = self.savepoints[position..]
            .iter()
            .map(|savepoint| savepoint.buffer.len())
            .sum();
        self.savepoints.truncate(position);
        self.active = self.savepoints.len().checked_sub(1);
        debug!("rolled back to '{}', {} message(s) discarded", name, discarded);
        Ok(())
    }

    /// Close `name`, keeping its messages in the savepoint below it
    pub fn release(&mut self, name: &str) -> Result<()> {
        let position = self.position(name)?;
        if position == 0 {
            return Err(Error::transaction(format!(
                "savepoint '{name}' is the outermost one and can only be flushed or rolled back"
            )));
        }
        let released: Vec<Savepoint> = self.savepoints.drain(position..).collect();
        let parent = &mut self.savepoints[position - 1];
        for savepoint in released {
            parent.buffer.extend(savepoint.buffer);
        }
        self.active = Some(position - 1);
        Ok(())
    }

    /// Publish everything buffered, in start order, and clear all savepoints
    ///
    /// State is cleared even when a publish fails part-way.
    pub fn flush(&mut self) -> Result<()> {
        let savepoints = std::mem::take(&mut self.savepoints);
        self.active = None;
        for savepoint in savepoints {
            for (message, routing_key) in savepoint.buffer {
                self.inner.publish(message, &routing_key)?;
            }
        }
        Ok(())
    }

    pub fn active_savepoint(&self) -> Option<&str> {
        self.active
            .map(|index| self.savepoints[index].name.as_str())
    }

    pub fn savepoint_names(&self) -> Vec<&str> {
        self.savepoints
            .iter()
            .map(|savepoint| savepoint.name.as_str())
            .collect()
    }

    pub fn buffered_len(&self) -> usize {
        self.savepoints
            .iter()
            .map(|savepoint| savepoint.buffer.len())
            .sum()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Publisher> Publisher for SavepointPublisher<P> {
    /// Buffer into the active savepoint, or publish straight away without one
    fn publish(&mut self, message: Message, routing_key: &str) -> Result<()> {
        match self.active {
            Some(index) => {
                self.savepoints[index]
                    .buffer
                    .push((message, routing_key.to_string()));
                Ok(())
            }
            None => self.inner.publish(message, routing_key),
        }
    }
}
