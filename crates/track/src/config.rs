use std::path::Path;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Colors assigned to users when no palette is configured.
pub const DEFAULT_PALETTE: &[&str] = &[
	"#d9534f", "#5b8def", "#46a35e", "#e0a030", "#9b59b6", "#1abc9c", "#e67e22", "#7f8c8d",
];

/// Change-tracking settings.
///
/// ```toml
/// date-bucket-minutes = 10
/// track-formatting = true
/// track-block-changes = true
/// palette = ["#d9534f", "#5b8def"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct TrackConfig {
	/// Width of the window in which edits by one user count as one change.
	pub date_bucket_minutes: u32,
	/// Record formatting changes as `format_change` marks.
	pub track_formatting: bool,
	/// Record block kind changes as block `block_change` entries.
	pub track_block_changes: bool,
	/// Highlight colors, handed out to users in first-seen order.
	pub palette: Vec<String>,
}

impl Default for TrackConfig {
	fn default() -> Self {
		Self {
			date_bucket_minutes: 10,
			track_formatting: true,
			track_block_changes: true,
			palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
		}
	}
}

impl TrackConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	pub fn validate(&self) -> Result<()> {
		if self.date_bucket_minutes == 0 {
			return Err(ConfigError::InvalidBucket);
		}
		if self.palette.is_empty() {
			return Err(ConfigError::EmptyPalette);
		}
		if let Some(bad) = self.palette.iter().find(|c| !is_hex_color(c)) {
			return Err(ConfigError::InvalidColor(bad.clone()));
		}
		Ok(())
	}

	/// Width of a date bucket.
	pub fn bucket_width(&self) -> TimeDelta {
		TimeDelta::minutes(i64::from(self.date_bucket_minutes.max(1)))
	}
}

fn is_hex_color(color: &str) -> bool {
	color
		.strip_prefix('#')
		.is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
