//! First-match composition of handlers

use crate::error::{Error, Result};
use crate::handler::{CatchableHandler, FlushableHandler, MessageHandler};
use crate::message::ReceivedMessage;
use std::sync::Arc;

/// Several handlers acting as one
///
/// A message goes to the first handler that supports it, with no fallback to
/// later handlers. The chain is flushable only when every member is.
#[derive(Clone, Default)]
pub struct MessageHandlerChain {
    handlers: Vec<Arc<dyn MessageHandler>>,
}

impl MessageHandlerChain {
    pub fn new(handlers: Vec<Arc<dyn MessageHandler>>) -> Self {
        Self { handlers }
    }

    pub fn push(&mut self, handler: Arc<dyn MessageHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn position(&self, message: &ReceivedMessage) -> Option<usize> {
        self.handlers
            .iter()
            .position(|handler| handler.supports(message))
    }

    fn not_supported(message: &ReceivedMessage) -> Error {
        Error::MessageHandlerNotSupported {
            queue: message.queue().to_string(),
            delivery_tag: message.delivery_tag(),
        }
    }
}

impl MessageHandler for MessageHandlerChain {
    fn supports(&self, message: &ReceivedMessage) -> bool {
        self.position(message).is_some()
    }

    fn handle(&self, message: &ReceivedMessage) -> Result<()> {
        match self.position(message) {
            Some(index) => self.handlers[index].handle(message),
            None => Err(Self::not_supported(message)),
        }
    }

    fn as_flushable(&self) -> Option<&dyn FlushableHandler> {
        let all_flushable = self
            .handlers
            .iter()
            .all(|handler| handler.as_flushable().is_some());
        if all_flushable {
            Some(self)
        } else {
            None
        }
    }

    fn as_catchable(&self) -> Option<&dyn CatchableHandler> {
        Some(self)
    }
}

impl FlushableHandler for MessageHandlerChain {
    /// Give each handler the part of the batch it is the first match for
    fn flush(&self, messages: &[ReceivedMessage]) -> Result<()> {
        let flushables = self
            .handlers
            .iter()
            .enumerate()
            .map(|(index, handler)| {
                handler.as_flushable().ok_or_else(|| {
                    Error::configuration(format!(
                        "handler #{} in the chain cannot flush batches",
                        index + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut partitions: Vec<Vec<ReceivedMessage>> = vec![Vec::new(); self.handlers.len()];
        for message in messages {
            let index = self
                .position(message)
                .ok_or_else(|| Self::not_supported(message))?;
            partitions[index].push(message.clone());
        }

        for (flushable, partition) in flushables.into_iter().zip(partitions) {
            if !partition.is_empty() {
                flushable.flush(&partition)?;
            }
        }
        Ok(())
    }
}

impl CatchableHandler for MessageHandlerChain {
    fn catch_error(&self, message: &ReceivedMessage, error: Error) -> Result<()> {
        let catchable = self
            .position(message)
            .and_then(|index| self.handlers[index].as_catchable());
        match catchable {
            Some(catchable) => catchable.catch_error(message, error),
            None => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::message::{Acknowledger, DeliveryInfo, Message};
    use std::sync::Mutex;

    struct NoopAcknowledger;

    impl Acknowledger for NoopAcknowledger {
        fn ack(&self, _delivery_tag: u64) -> Result<()> {
            Ok(())
        }

        fn nack(&self, _delivery_tag: u64, _requeue: bool) -> Result<()> {
            Ok(())
        }
    }

    fn received(queue: &str, tag: u64) -> ReceivedMessage {
        ReceivedMessage::new(
            Message::new(format!("{queue}-{tag}")),
            DeliveryInfo {
                delivery_tag: tag,
                queue: queue.to_string(),
                routing_key: queue.to_string(),
                exchange: String::new(),
                redelivered: false,
            },
            Arc::new(NoopAcknowledger),
        )
    }

    /// Flushable handler for one queue that records what it saw
    #[derive(Default)]
    struct Batching {
        queue: &'static str,
        flushed: Mutex<Vec<Vec<u64>>>,
    }

    impl MessageHandler for Batching {
        fn supports(&self, message: &ReceivedMessage) -> bool {
            message.queue() == self.queue
        }

        fn handle(&self, _message: &ReceivedMessage) -> Result<()> {
            Ok(())
        }

        fn as_flushable(&self) -> Option<&dyn FlushableHandler> {
            Some(self)
        }
    }

    impl FlushableHandler for Batching {
        fn flush(&self, messages: &[ReceivedMessage]) -> Result<()> {
            self.flushed
                .lock()
                .unwrap()
                .push(messages.iter().map(ReceivedMessage::delivery_tag).collect());
            Ok(())
        }
    }

    #[test]
    fn test_first_match_wins() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (first, second) = (Arc::clone(&seen), Arc::clone(&seen));
        let chain = MessageHandlerChain::new(vec![
            Arc::new(
                handler_fn(move |_m: &ReceivedMessage| {
                    first.lock().unwrap().push("orders handler");
                    Ok(())
                })
                .supporting(|m| m.queue() == "orders"),
            ) as Arc<dyn MessageHandler>,
            Arc::new(handler_fn(move |_m: &ReceivedMessage| {
                second.lock().unwrap().push("catch-all");
                Ok(())
            })),
        ]);

        chain.handle(&received("orders", 1)).unwrap();
        chain.handle(&received("audit", 2)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["orders handler", "catch-all"]);
    }

    #[test]
    fn test_only_first_supporting_handler_runs() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler = |name: &'static str| {
            let seen = Arc::clone(&seen);
            handler_fn(move |_m: &ReceivedMessage| {
                seen.lock().unwrap().push(name);
                Ok(())
            })
        };
        let chain = MessageHandlerChain::new(vec![
            Arc::new(handler("first").supporting(|_m| false)) as Arc<dyn MessageHandler>,
            Arc::new(handler("second").supporting(|_m| true)),
            Arc::new(handler("third").supporting(|_m| true)),
        ]);

        assert!(chain.supports(&received("orders", 1)));
        chain.handle(&received("orders", 1)).unwrap();
        chain.handle(&received("audit", 2)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["second", "second"]);
    }

    #[test]
    fn test_unsupported_message() {
        let handler: Arc<dyn MessageHandler> = Arc::new(
            handler_fn(|_m: &ReceivedMessage| Ok(())).supporting(|m| m.queue() == "orders"),
        );
        let chain = MessageHandlerChain::new(vec![handler]);

        assert!(!chain.supports(&received("other", 9)));
        match chain.handle(&received("other", 9)) {
            Err(Error::MessageHandlerNotSupported { queue, delivery_tag }) => {
                assert_eq!(queue, "other");
                assert_eq!(delivery_tag, 9);
            }
            other => panic!("Expected MessageHandlerNotSupported, got {:?}", other),
        }
    }

    #[test]
    fn test_flushable_only_when_every_handler_is() {
        let mixed = MessageHandlerChain::new(vec![
            Arc::new(Batching {
                queue: "a",
                ..Default::default()
            }) as Arc<dyn MessageHandler>,
            Arc::new(handler_fn(|_m: &ReceivedMessage| Ok(()))),
        ]);
        assert!(mixed.as_flushable().is_none());
        assert!(matches!(
            FlushableHandler::flush(&mixed, &[received("a", 1)]),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_flush_partitions_batch_by_first_match() {
        let a = Arc::new(Batching {
            queue: "a",
            ..Default::default()
        });
        let b = Arc::new(Batching {
            queue: "b",
            ..Default::default()
        });
        let chain = MessageHandlerChain::new(vec![a.clone() as Arc<dyn MessageHandler>, b.clone()]);

        let batch = [received("a", 1), received("b", 2), received("a", 3)];
        chain.as_flushable().unwrap().flush(&batch).unwrap();

        assert_eq!(*a.flushed.lock().unwrap(), vec![vec![1, 3]]);
        assert_eq!(*b.flushed.lock().unwrap(), vec![vec![2]]);
    }

    #[test]
    fn test_catch_error_rethrows_without_hook() {
        let handler: Arc<dyn MessageHandler> = Arc::new(handler_fn(|_m: &ReceivedMessage| Ok(())));
        let chain = MessageHandlerChain::new(vec![handler]);
        let catchable = chain.as_catchable().unwrap();

        match catchable.catch_error(&received("q", 1), Error::handler("boom")) {
            Err(Error::Handler(source)) => assert_eq!(source.to_string(), "boom"),
            other => panic!("Expected the original error, got {:?}", other),
        }
    }
}
