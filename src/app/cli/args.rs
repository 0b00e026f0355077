//! Command-line arguments
//!
//! Global options configure logging and locate the configuration file;
//! the subcommand selects what to do with it.

use crate::core::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "amqp-runner")]
#[command(about = "Run configured AMQP consumers and declare broker topology")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Declare the configured exchanges and their bindings
    InitializeExchanges {
        /// Connection to declare them on
        #[arg(long, default_value = crate::config::DEFAULT_CONNECTION)]
        connection: String,
    },

    /// Declare the configured queues and bind them
    InitializeQueues {
        /// Connection to declare them on
        #[arg(long, default_value = crate::config::DEFAULT_CONNECTION)]
        connection: String,
    },

    /// List the configured consumers
    ListConsumers,

    /// Run one configured consumer
    RunConsumer {
        /// Consumer key from the configuration file
        key: String,

        /// Read timeout in seconds, overriding the configured one
        #[arg(long, value_name = "SECONDS")]
        read_timeout: Option<f64>,

        /// Keep consuming across read timeouts
        #[arg(long = "loop")]
        looping: bool,

        /// Stop after this many handled messages
        #[arg(long, value_name = "N")]
        messages: Option<usize>,
    },

    /// Rotate over the consumers listed in the round_robin section
    RunRoundRobinConsumer,
}
