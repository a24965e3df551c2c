//! Logging setup and user-facing warnings.
//!
//! Everything goes to stderr so stdout carries only the report.

use tracing::{debug, warn as emit_warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` wins over the verbosity flag.
pub fn init(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();

    debug!("nomad-chain started with verbosity level: {}", verbose);
}

pub fn warn(message: impl AsRef<str>) {
    emit_warn!("{}", message.as_ref());
}
