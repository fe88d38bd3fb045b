//! embedpy CLI library - exposes command handlers for the binary and tests

pub mod commands;
pub mod common;

pub use common::GlobalOpts;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Route `tracing` events from the bridge to stderr.
///
/// `RUST_LOG` wins when set; otherwise the filter follows the CLI verbosity.
pub fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "embedpy=warn",
        1 => "embedpy=debug",
        _ => "embedpy=trace",
    };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
