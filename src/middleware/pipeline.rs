//! Ordered middleware lists folded into one executable

use crate::error::Result;
use crate::message::{Message, ReceivedMessage};
use crate::middleware::{ConsumerMiddleware, Flow, PublisherMiddleware};
use std::sync::Arc;

/// Composed consumer-side call: middleware stack plus final handler
pub type ConsumerNext = dyn Fn(ReceivedMessage) -> Result<Flow> + Send + Sync;
pub type ConsumerExecutable = Arc<ConsumerNext>;

/// Composed publisher-side call: middleware stack plus final publish
pub type PublisherNext = dyn Fn(Message, &str) -> Result<()> + Send + Sync;
pub type PublisherExecutable = Arc<PublisherNext>;

/// Immutable-order list of middleware
///
/// The first middleware added is the outermost: it runs first on the way in
/// and last on the way out.
pub struct MiddlewarePipeline<M: ?Sized> {
    middlewares: Vec<Arc<M>>,
}

pub type ConsumerPipeline = MiddlewarePipeline<dyn ConsumerMiddleware>;
pub type PublisherPipeline = MiddlewarePipeline<dyn PublisherMiddleware>;

impl<M: ?Sized> MiddlewarePipeline<M> {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn with(middlewares: Vec<Arc<M>>) -> Self {
        Self { middlewares }
    }

    pub fn push(&mut self, middleware: Arc<M>) {
        self.middlewares.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<M: ?Sized> Default for MiddlewarePipeline<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ?Sized> Clone for MiddlewarePipeline<M> {
    fn clone(&self) -> Self {
        Self {
            middlewares: self.middlewares.clone(),
        }
    }
}

impl MiddlewarePipeline<dyn ConsumerMiddleware> {
    /// Fold the stack right to left around `last`
    pub fn create_executable(&self, last: ConsumerExecutable) -> ConsumerExecutable {
        self.middlewares.iter().rev().fold(last, |next, middleware| {
            let middleware = Arc::clone(middleware);
            let step: ConsumerExecutable =
                Arc::new(move |message: ReceivedMessage| middleware.handle(message, next.as_ref()));
            step
        })
    }
}

impl MiddlewarePipeline<dyn PublisherMiddleware> {
    /// Fold the stack right to left around `last`
    pub fn create_executable(&self, last: PublisherExecutable) -> PublisherExecutable {
        self.middlewares.iter().rev().fold(last, |next, middleware| {
            let middleware = Arc::clone(middleware);
            let step: PublisherExecutable = Arc::new(move |message: Message, routing_key: &str| {
                middleware.handle(message, next.as_ref(), routing_key)
            });
            step
        })
    }
}
