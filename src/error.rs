//! Error taxonomy shared by every layer of the runtime
//!
//! Control-flow signals (a consumer reaching its execution limit, a benign read
//! timeout) are not errors here: consumers report them through
//! [`crate::consumer::ConsumeOutcome`] and middleware through
//! [`crate::middleware::Flow`]. `ConsumerTimeoutExceed` is still an error at the
//! transport boundary and for an exhausted round-robin deadline.

use std::time::Duration;

/// Boxed error produced by application handlers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection to {endpoint} failed: {message}")]
    Connection { endpoint: String, message: String },

    #[error("Broker rejected credentials of user '{username}' on {endpoint}")]
    BadCredentials { endpoint: String, username: String },

    #[error("Consumer timeout exceeded: no delivery within {timeout:?}")]
    ConsumerTimeoutExceed { timeout: Duration },

    #[error("No handler supports message {delivery_tag} from queue '{queue}'")]
    MessageHandlerNotSupported { queue: String, delivery_tag: u64 },

    #[error("Header not found: {name}")]
    HeaderNotFound { name: String },

    #[error("Message {delivery_tag} has already been answered")]
    AlreadyAnswered { delivery_tag: u64 },

    #[error("Message {delivery_tag} was answered outside of flush by a flushable handler")]
    AnsweredByFlushableHandler { delivery_tag: u64 },

    #[error("Savepoint not found: {name}")]
    SavepointNotFound { name: String },

    #[error("Savepoint already exists: {name}")]
    SavepointAlreadyExists { name: String },

    #[error("Transaction error: {message}")]
    Transaction { message: String },

    #[error("Channel error: {message}")]
    Channel { message: String },

    #[error("Invalid DSN '{dsn}': {reason}")]
    InvalidDsn { dsn: String, reason: String },

    #[error("No transport driver registered for scheme '{scheme}'")]
    UnknownDriver { scheme: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Handler failed: {0}")]
    Handler(#[source] BoxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl Error {
    /// Wrap an application error raised by a message handler
    pub fn handler<E: Into<BoxError>>(error: E) -> Self {
        Error::Handler(error.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Error::Channel {
            message: message.into(),
        }
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Error::Transaction {
            message: message.into(),
        }
    }

    /// True for transport-level connect failures, bad credentials included
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::Connection { .. } | Error::BadCredentials { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ConsumerTimeoutExceed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_credentials_is_a_connection_error() {
        let error = Error::BadCredentials {
            endpoint: "host1:5672".to_string(),
            username: "guest".to_string(),
        };
        assert!(error.is_connection_error());
        assert!(!error.is_timeout());
        assert!(error.to_string().contains("guest"));
    }

    #[test]
    fn test_handler_error_keeps_source() {
        let error = Error::handler("database unavailable");
        assert!(matches!(error, Error::Handler(_)));
        assert_eq!(error.to_string(), "Handler failed: database unavailable");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_timeout_classification() {
        let error = Error::ConsumerTimeoutExceed {
            timeout: Duration::from_secs(3),
        };
        assert!(error.is_timeout());
        assert!(!error.is_connection_error());
    }
}
