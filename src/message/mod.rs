//! Message Model
//!
//! Immutable value types handed to publishers ([`Message`]) and produced by
//! consumers ([`ReceivedMessage`]). Every "setter" returns a new value; the only
//! mutable state is the answered bit of a received message.
//!
//! ```rust
//! use amqp_runner::message::{Message, Options};
//!
//! let message = Message::new("order created")
//!     .with_header("tenant", "acme")
//!     .with_options(Options::default().with_expiration(30_000));
//!
//! assert!(message.headers().has("tenant"));
//! assert_eq!(message.options().delivery_mode(), 2);
//! ```

mod envelope;
mod headers;
mod identifier;
mod options;
mod payload;
mod received;

pub use envelope::Message;
pub use headers::{HeaderValue, Headers};
pub use identifier::Identifier;
pub use options::{Options, DELIVERY_MODE_PERSISTENT, DELIVERY_MODE_TRANSIENT};
pub use payload::{Payload, DEFAULT_CONTENT_TYPE};
pub use received::{Acknowledger, DeliveryInfo, ReceivedMessage};
