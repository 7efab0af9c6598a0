//! Logging and metric helpers shared by the relay server and the client CLI.
//!
//! Logs go through `tracing` to stderr; the subscriber honours `RUST_LOG` and `LOG_FORMAT`
//! (`text`/`pretty`/`plain` for human output, anything else for JSON).

use anyhow::Result;

mod config;
mod counters;
mod tracing_init;

pub use config::TelemetryConfig;
pub use counters::{record_counter, record_outcome};
pub use tracing_init::init_telemetry;

/// Installs the subscriber for `service_name`, reading the rest from the environment.
pub fn install(service_name: &str, service_version: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(service_name, service_version))
}
