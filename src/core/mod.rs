//! Process-level infrastructure: logging, fatal error reporting, stop
//! signals and lock helpers

pub mod error_handling;
pub mod logging;
pub mod shutdown;
pub mod sync;
