//! Exchange, queue and binding definitions
//!
//! These are plain data; they are deserialised from the runtime configuration
//! and handed to [`Channel`](super::Channel) declare calls.

use crate::message::HeaderValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

pub type Arguments = BTreeMap<String, HeaderValue>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExchangeKind {
    #[default]
    Direct,
    Fanout,
    Topic,
    Headers,
}

/// Binding of a queue or exchange to a source exchange
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Binding {
    pub exchange: String,
    pub routing_key: String,
    pub arguments: Arguments,
}

impl Binding {
    pub fn new(exchange: impl Into<String>, routing_key: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            arguments: Arguments::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ExchangeKind,
    #[serde(default = "default_true")]
    pub durable: bool,
    #[serde(default)]
    pub auto_delete: bool,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub arguments: Arguments,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

impl ExchangeDefinition {
    pub fn new(name: impl Into<String>, kind: ExchangeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            durable: true,
            auto_delete: false,
            internal: false,
            arguments: Arguments::new(),
            bindings: Vec::new(),
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueDefinition {
    pub name: String,
    #[serde(default = "default_true")]
    pub durable: bool,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(default)]
    pub auto_delete: bool,
    #[serde(default)]
    pub arguments: Arguments,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

impl QueueDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            durable: true,
            exclusive: false,
            auto_delete: false,
            arguments: Arguments::new(),
            bindings: Vec::new(),
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_exchange_kind_strings() {
        assert_eq!(ExchangeKind::Topic.to_string(), "topic");
        assert_eq!(ExchangeKind::from_str("headers").unwrap(), ExchangeKind::Headers);
        assert!(ExchangeKind::from_str("x-delayed").is_err());
    }

    #[test]
    fn test_definitions_from_toml() {
        let exchange: ExchangeDefinition = toml::from_str(
            r#"
            name = "events"
            type = "topic"
            [[bindings]]
            exchange = "upstream"
            routing_key = "order.#"
            "#,
        )
        .unwrap();
        assert_eq!(exchange.kind, ExchangeKind::Topic);
        assert!(exchange.durable);
        assert_eq!(exchange.bindings[0].routing_key, "order.#");

        let queue: QueueDefinition = toml::from_str(
            r#"
            name = "orders"
            durable = false
            arguments = { "x-max-priority" = 10 }
            "#,
        )
        .unwrap();
        assert!(!queue.durable);
        assert_eq!(queue.arguments["x-max-priority"], HeaderValue::Int(10));
    }
}
