//! Closure-backed handlers

use crate::error::Result;
use crate::handler::MessageHandler;
use crate::message::ReceivedMessage;

type Predicate = Box<dyn Fn(&ReceivedMessage) -> bool + Send + Sync>;

pub struct FnHandler<F> {
    handle: F,
    supports: Option<Predicate>,
}

/// Wrap a closure as a handler that supports every message
pub fn handler_fn<F>(handle: F) -> FnHandler<F>
where
    F: Fn(&ReceivedMessage) -> Result<()> + Send + Sync,
{
    FnHandler {
        handle,
        supports: None,
    }
}

impl<F> FnHandler<F> {
    /// Restrict the handler to messages matching `predicate`
    pub fn supporting<P>(self, predicate: P) -> Self
    where
        P: Fn(&ReceivedMessage) -> bool + Send + Sync + 'static,
    {
        Self {
            supports: Some(Box::new(predicate)),
            ..self
        }
    }
}

impl<F> MessageHandler for FnHandler<F>
where
    F: Fn(&ReceivedMessage) -> Result<()> + Send + Sync,
{
    fn supports(&self, message: &ReceivedMessage) -> bool {
        self.supports
            .as_ref()
            .map_or(true, |predicate| predicate(message))
    }

    fn handle(&self, message: &ReceivedMessage) -> Result<()> {
        (self.handle)(message)
    }
}
