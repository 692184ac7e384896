//! Diagnostic logging via `tracing`
//!
//! User-facing output goes through [`crate::ui::Reporter`]; tracing carries the
//! host commands, URLs and paths behind each step. `RUST_LOG` wins over the level
//! derived from the output options.

use tracing_subscriber::EnvFilter;

use crate::ui::OutputOptions;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(options: &OutputOptions) -> &'static str {
    if options.verbose {
        "winget_bootstrap=debug"
    } else {
        "winget_bootstrap=warn"
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_tracing(options: &OutputOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(options)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
