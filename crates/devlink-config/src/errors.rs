use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while assembling the layered configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command-line or environment overrides could not be parsed.
    ///
    /// Help and version requests also surface here; callers typically hand
    /// the inner error to [`clap::Error::exit`].
    #[error(transparent)]
    Cli(#[from] clap::Error),
    /// The configuration file could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    ReadFile {
        /// File that was requested.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML for the expected schema.
    #[error("failed to parse configuration file '{path}': {source}")]
    ParseFile {
        /// File that was parsed.
        path: Utf8PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}
