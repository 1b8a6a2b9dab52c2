//! Error types for change-tracking configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or validating a [`TrackConfig`].
///
/// [`TrackConfig`]: crate::TrackConfig
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or mapping it onto the config schema.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A palette entry is not a `#RRGGBB` color.
	#[error("invalid color format: {0}")]
	InvalidColor(String),

	/// The palette holds no colors.
	#[error("palette must hold at least one color")]
	EmptyPalette,

	/// The date bucket width is zero.
	#[error("date-bucket-minutes must be at least 1")]
	InvalidBucket,
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
