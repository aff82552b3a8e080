//! Logging Module
//!
//! Installs the tracing subscriber used by library consumers that do not
//! bring their own. Falls back to a plain console logger at the default
//! level rather than failing when `RUST_LOG` is unset, and degrades to a
//! no-op when a subscriber is already installed.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes a global fmt subscriber with env-filter support.
///
/// Level defaults to `cachefront=info` and can be overridden with the
/// `RUST_LOG` environment variable. Safe to call more than once; later calls
/// leave the existing subscriber in place.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachefront=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
