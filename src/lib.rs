//! Consumer and publisher orchestration runtime for AMQP-style brokers.
//!
//! The crate turns a blocking "receive one message, call back" transport into
//! four consumer modes ([`consumer::SingleConsumer`], [`consumer::LoopConsumer`],
//! [`consumer::SpoolConsumer`], [`consumer::RoundRobinConsumer`]), threads every
//! message through a [`middleware`] pipeline, and publishes through plain or
//! savepoint-buffered [`publisher`]s.

pub mod app;
pub mod config;
pub mod connection;
pub mod consumer;
pub mod core;
pub mod error;
pub mod handler;
pub mod message;
pub mod middleware;
pub mod publisher;
pub mod transport;

pub use error::{Error, Result};

include!(concat!(env!("OUT_DIR"), "/version.rs"));
