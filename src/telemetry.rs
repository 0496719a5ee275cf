//! Structured logging initialisation.
//!
//! The messaging core emits `tracing` events and spans; binaries embedding the
//! crate call [`init_tracing`] once at start-up to install a formatting
//! subscriber filtered by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global `tracing` subscriber.
///
/// Returns `false` when a global subscriber was already installed, which makes
/// the call safe to repeat from tests.
#[must_use = "a false result means another subscriber is already active"]
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
