//! Test modules for the transport layer
//!
//! Exercises the in-process broker through the public channel traits,
//! organised by functional area.

mod delivery;
mod helpers;
mod routing;
