//! Test modules for publishers and transactions


use crate::error::Result;
use crate::message::Message;
use crate::publisher::Publisher;

/// Publisher that remembers what it was asked to publish
#[derive(Default)]
pub struct Recording {
    pub published: Vec<(String, String)>,
    pub fail_on: Option<String>,
}

impl Recording {
    pub fn texts(&self) -> Vec<&str> {
        self.published.iter().map(|(text, _)| text.as_str()).collect()
    }
}

impl Publisher for Recording {
    fn publish(&mut self, message: Message, routing_key: &str) -> Result<()> {
        let text = message.payload().as_text().unwrap_or_default().to_string();
        if self.fail_on.as_deref() == Some(text.as_str()) {
            return Err(crate::error::Error::channel(format!("refused '{text}'")));
        }
        self.published.push((text, routing_key.to_string()));
        Ok(())
    }
}
