//! Test modules for consumers
//!
//! Every consumer runs against the in-process broker; fixtures live in
//! `helpers`.

mod helpers;
mod round_robin;
mod strategy;
