//! Logging setup for hosts embedding the provider.
//!
//! The provider itself only emits `tracing` events; these helpers install a
//! subscriber that writes them to **stderr**, leaving stdout to the host.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `debug`, `cafe_provider=debug`)
//!
//! # Examples
//!
//! ```bash
//! # Show debug logs for the provider only
//! RUST_LOG=warn,cafe_provider=debug ./my-host
//!
//! # Include the HTTP client's own logs
//! RUST_LOG=cafe_provider=debug,reqwest=debug ./my-host
//! ```

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

fn subscriber(default_filter: &str) -> impl SubscriberInitExt {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Initialize the default logging subscriber.
///
/// Respects `RUST_LOG` and falls back to [`DEFAULT_FILTER`].
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
///
/// # Example
///
/// ```ignore
/// use cafe_provider::init_logging;
///
/// fn main() {
///     init_logging();
///     tracing::info!("Host starting");
/// }
/// ```
pub fn init_logging() {
    subscriber(DEFAULT_FILTER).init();
}

/// Initialize logging with a custom default filter, e.g. `"cafe_provider=debug"`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_filter: &str) {
    subscriber(default_filter).init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Useful in tests, where several cases may race to install a subscriber.
pub fn try_init_logging() -> bool {
    subscriber(DEFAULT_FILTER).try_init().is_ok()
}
