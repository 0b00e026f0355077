//! Handler that writes a description of every message

use crate::core::sync::lock;
use crate::error::Result;
use crate::handler::{FlushableHandler, MessageHandler};
use crate::message::ReceivedMessage;
use std::io::{self, Write};
use std::sync::Mutex;

/// Longest payload excerpt written per message
const EXCERPT_LEN: usize = 120;

/// Writes one line per message and leaves the answer to the consumer
///
/// Flushable, so it also works under the spool consumer.
pub struct DumpHandler<W> {
    writer: Mutex<W>,
}

impl DumpHandler<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> DumpHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn describe(message: &ReceivedMessage) -> String {
        let payload = message.payload();
        let body = match payload.as_text() {
            Some(text) if text.chars().count() > EXCERPT_LEN => {
                format!("{}...", text.chars().take(EXCERPT_LEN).collect::<String>())
            }
            Some(text) => text.to_string(),
            None => format!("<{} bytes>", payload.len()),
        };
        let exchange = if message.exchange().is_empty() {
            "(default)"
        } else {
            message.exchange()
        };
        let mut line = format!(
            "#{} {} {} -> {} [{}]",
            message.delivery_tag(),
            exchange,
            message.routing_key(),
            message.queue(),
            payload.content_type()
        );
        for (name, value) in message.headers().iter() {
            line.push_str(&format!(" {name}={value}"));
        }
        line.push_str(&format!(" {body}"));
        line
    }
}

impl<W: Write + Send> MessageHandler for DumpHandler<W> {
    fn handle(&self, message: &ReceivedMessage) -> Result<()> {
        let mut writer = lock(&self.writer)?;
        writeln!(writer, "{}", Self::describe(message))?;
        Ok(())
    }

    fn as_flushable(&self) -> Option<&dyn FlushableHandler> {
        Some(self)
    }
}

impl<W: Write + Send> FlushableHandler for DumpHandler<W> {
    fn flush(&self, messages: &[ReceivedMessage]) -> Result<()> {
        let mut writer = lock(&self.writer)?;
        writeln!(writer, "-- flushed {} message(s)", messages.len())?;
        writer.flush()?;
        Ok(())
    }
}
