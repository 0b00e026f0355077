//! Command-line interface

mod args;
mod display;

pub use args::{Args, Command};
pub use display::consumer_table;
