//! Tabular output for the CLI

use crate::config::RuntimeConfig;
use prettytable::{format, row, Table};

/// One row per configured consumer, sorted by key
pub fn consumer_table(config: &RuntimeConfig) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(row![b => "Consumer", "Mode", "Queue", "Connection", "Prefetch", "Read timeout"]);

    for (key, consumer) in &config.consumers {
        table.add_row(row![
            key,
            consumer.mode,
            consumer.queue,
            consumer.connection,
            consumer.prefetch_count,
            format!("{}s", consumer.read_timeout)
        ]);
    }
    table
}
