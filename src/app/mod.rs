//! Command-line application
//!
//! [`run`] parses arguments, starts logging, loads the configuration and
//! dispatches the subcommand. Failures are logged once through
//! [`log_error_with_context`] and turned into a non-zero exit code.

pub mod cli;
mod runtime;

pub use runtime::{RunOptions, Runtime};

use crate::config::RuntimeConfig;
use crate::consumer::{ConsumeOutcome, Consumer};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::install_signal_handlers;
use crate::error::Result;
use crate::transport::DriverRegistry;
use clap::Parser;
use cli::{Args, Command};
use log::{debug, info};
use std::io::IsTerminal;

/// Run the CLI with process arguments, returning the exit code
pub fn run(registry: DriverRegistry) -> i32 {
    let args = Args::parse();

    let config = match RuntimeConfig::discover(args.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // logging is not up yet
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let logging = &config.logging;
    let color = logging.color && !args.no_color && std::io::stderr().is_terminal();
    let level = args.log_level.as_deref().unwrap_or(&logging.level);
    let format = args.log_format.unwrap_or(logging.format);
    let file = args.log_file.as_deref().or(logging.file.as_deref());
    if let Err(e) = init_logging(level, format, file, color) {
        eprintln!("Error: {e}");
        return 1;
    }
    debug!(
        "{} {} ({} built {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        crate::GIT_HASH,
        crate::BUILD_TIME
    );

    let runtime = Runtime::new(config, registry);
    match execute(&runtime, &args.command) {
        Ok(()) => 0,
        Err(e) => {
            log_error_with_context(&e, &format!("{:?} failed", args.command));
            1
        }
    }
}

/// Dispatch one subcommand against `runtime`
pub fn execute(runtime: &Runtime, command: &Command) -> Result<()> {
    match command {
        Command::InitializeExchanges { connection } => {
            let declared = runtime.initialize_exchanges(connection)?;
            info!("Declared {} exchange(s) on '{}'", declared, connection);
        }
        Command::InitializeQueues { connection } => {
            let declared = runtime.initialize_queues(connection)?;
            info!("Declared {} queue(s) on '{}'", declared, connection);
        }
        Command::ListConsumers => {
            if runtime.config().consumers.is_empty() {
                eprintln!("No consumers configured.");
            } else {
                cli::consumer_table(runtime.config()).printstd();
            }
        }
        Command::RunConsumer {
            key,
            read_timeout,
            looping,
            messages,
        } => {
            let options = RunOptions {
                read_timeout: *read_timeout,
                looping: *looping,
                messages: *messages,
            };
            let mut consumer = runtime.consumer(key, &options)?;
            install_signal_handlers(&consumer.stop_signal());
            report(key, consumer.run()?);
        }
        Command::RunRoundRobinConsumer => {
            let mut consumer = runtime.round_robin_consumer()?;
            install_signal_handlers(&consumer.stop_signal());
            match consumer.run() {
                Ok(outcome) => report("round-robin", outcome),
                Err(e) if e.is_timeout() => info!("Round-robin consumer finished: {}", e),
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}

fn report(name: &str, outcome: ConsumeOutcome) {
    match outcome {
        ConsumeOutcome::Stopped => info!("Consumer '{}' stopped", name),
        ConsumeOutcome::LimitReached => info!("Consumer '{}' reached its message limit", name),
        ConsumeOutcome::TimedOut => info!("Consumer '{}' timed out waiting for messages", name),
    }
}
