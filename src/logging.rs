//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::AppError;

/// Default filter when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Install the global subscriber. `RUST_LOG` wins over `level`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(level: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}
