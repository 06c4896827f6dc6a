use std::ops::Range;
use std::path::Path;

use serde::Deserialize;

use crate::FusionError;
use crate::FusionResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["fusion.toml", ".fusion.toml"];

/// Default chrono format for date placeholders: two-digit day, two-digit
/// month, four-digit year.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Run configuration loaded from a `fusion.toml` file.
///
/// ```toml
/// template = "letter.json"
/// data = "rows.csv"
/// output = "out"
/// name_field = "NAME"
/// date_format = "%d/%m/%Y"
///
/// [rows]
/// first = 2
/// last = 20
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
	/// Identifier of the template document copied for each row. Required —
	/// a missing template aborts the whole run.
	#[serde(default)]
	pub template: String,
	/// Identifier of the row source handed to the host binding.
	#[serde(default = "default_data")]
	pub data: String,
	/// Destination identifier handed to the document store and export sink.
	#[serde(default = "default_output")]
	pub output: String,
	/// Row field used to name per-row artifacts. Rows without the field fall
	/// back to their row number.
	#[serde(default = "default_name_field")]
	pub name_field: String,
	/// chrono format string for date placeholder rendering.
	#[serde(default = "default_date_format")]
	pub date_format: String,
	/// Optional 1-based inclusive row bounds. When absent, every row is
	/// merged.
	#[serde(default)]
	pub rows: Option<RowRange>,
}

/// 1-based inclusive row-range bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RowRange {
	#[serde(default = "default_first_row")]
	pub first: usize,
	#[serde(default)]
	pub last: Option<usize>,
}

impl Default for MergeConfig {
	fn default() -> Self {
		Self {
			template: String::new(),
			data: default_data(),
			output: default_output(),
			name_field: default_name_field(),
			date_format: default_date_format(),
			rows: None,
		}
	}
}

impl MergeConfig {
	/// Load the config from an explicit file path.
	pub fn load(path: &Path) -> FusionResult<Self> {
		let raw = std::fs::read_to_string(path)?;
		let config: Self =
			toml::from_str(&raw).map_err(|error| FusionError::ConfigParse(error.to_string()))?;
		config.validate()?;

		Ok(config)
	}

	/// Discover and load the config from a run root directory.
	pub fn discover(root: &Path) -> FusionResult<Self> {
		for candidate in CONFIG_FILE_CANDIDATES {
			let path = root.join(candidate);
			if path.is_file() {
				return Self::load(&path);
			}
		}

		Err(FusionError::MissingConfig(root.display().to_string()))
	}

	/// Unrecoverable configuration errors abort the entire run (unlike
	/// per-row failures, which only skip their row).
	pub fn validate(&self) -> FusionResult<()> {
		if self.template.trim().is_empty() {
			return Err(FusionError::MissingTemplate);
		}

		Ok(())
	}

	/// The 0-based index range selected by the configured row bounds, clamped
	/// to the available row count.
	pub fn row_bounds(&self, total: usize) -> Range<usize> {
		let Some(range) = self.rows else {
			return 0..total;
		};

		let start = range.first.saturating_sub(1).min(total);
		let end = range.last.map_or(total, |last| last.min(total));

		start..end.max(start)
	}
}

fn default_data() -> String {
	"rows.csv".to_string()
}

fn default_output() -> String {
	"out".to_string()
}

fn default_name_field() -> String {
	"NAME".to_string()
}

fn default_date_format() -> String {
	DEFAULT_DATE_FORMAT.to_string()
}

fn default_first_row() -> usize {
	1
}
