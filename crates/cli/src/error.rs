//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No config file was found and no spec URL was given on the command line.
    #[error("config not found at {path}. Create it or pass --url")]
    ConfigNotFound { path: PathBuf },

    /// The config file could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `process` was called without model output.
    #[error("no model output given on the command line or stdin")]
    EmptyInput,

    /// An error occurred in the driver.
    #[error(transparent)]
    Driver(#[from] driver::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
