use amqp_runner::transport::{DriverRegistry, MemoryBroker};
use std::sync::Arc;

fn main() {
    // the in-process broker is the only bundled driver
    let registry = DriverRegistry::with_memory(Arc::new(MemoryBroker::new()));
    std::process::exit(amqp_runner::app::run(registry));
}
