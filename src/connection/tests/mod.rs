//! Test modules for connections, failover and cache invalidation

mod invalidation;
mod topology;
