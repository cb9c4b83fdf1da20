//! GDScript Syntax Tree Tool
//!
//! Command handlers behind the `gdsc` binary. Every command has a pure core
//! that works on text and returns what would be printed, so the same code
//! serves the CLI and the integration tests.
//!
//! # Logging
//!
//! The parser logs through `tracing`. Set `RUST_LOG` (for example
//! `RUST_LOG=gds_parse=debug`) to see incremental reparse decisions.

pub mod commands;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Only installs a subscriber when `RUST_LOG`
/// is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
