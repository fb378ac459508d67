use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Write, fs, path::PathBuf};

use crate::format::DEFAULT_DATE_PATTERN;
use crate::layout::GridSpec;

/// Grid geometry measured in terminal character cells.
pub const TERMINAL_GRID: GridSpec = GridSpec { cell_width: 16.0, cell_height: 4.0, min_spacing: 2.0 };

pub const DEFAULT_DAYS: usize = 7;
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 80.0;

/// Knobs for the locally generated forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Simulated response time for each request.
    pub latency_ms: u64,

    /// Make every forecast request fail.
    pub fail_forecast: bool,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// location = "Cupertino"
/// days = 5
///
/// [grid]
/// cell_width = 16.0
/// cell_height = 4.0
/// min_spacing = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location shown in the title. Absent means the service cannot resolve one.
    pub location: Option<String>,
    pub days: usize,
    /// chrono strftime pattern for the date under each cell.
    pub date_format: String,
    pub viewport_width: f64,
    /// Fields left out of `[grid]` fall back to [`TERMINAL_GRID`].
    #[serde(deserialize_with = "terminal_grid")]
    pub grid: GridSpec,
    pub demo: DemoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: None,
            days: DEFAULT_DAYS,
            date_format: DEFAULT_DATE_PATTERN.to_string(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            grid: TERMINAL_GRID,
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast-screen", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Reject geometry the grid cannot be laid out with.
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        if !(positive(grid.cell_width) && positive(grid.cell_height)) {
            bail!(
                "Grid cells must have a positive size (got {}x{}).\n\
                 Hint: fix the [grid] section or run `forecast configure`.",
                grid.cell_width,
                grid.cell_height
            );
        }
        if !non_negative(grid.min_spacing) {
            bail!("Grid spacing must not be negative (got {}).", grid.min_spacing);
        }
        if !non_negative(self.viewport_width) {
            bail!("Viewport width must not be negative (got {}).", self.viewport_width);
        }
        if !date_pattern_applies(&self.date_format) {
            bail!(
                "Invalid date format pattern '{}'.\n\
                 Hint: only date fields (e.g. %a %b %-d, %Y-%m-%d) can be used.",
                self.date_format
            );
        }
        Ok(())
    }

    /// Location, treating a blank string as unset.
    pub fn location_name(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Whether `pattern` parses and can be applied to a bare date.
/// Time and offset fields (`%H`, `%S`, `%z`, ...) parse but fail on a date.
pub fn date_pattern_applies(pattern: &str) -> bool {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return false;
    }
    let sample = NaiveDate::from_ymd_opt(2016, 11, 19).unwrap_or(NaiveDate::MIN);
    write!(String::new(), "{}", sample.format(pattern)).is_ok()
}

fn terminal_grid<'de, D>(deserializer: D) -> std::result::Result<GridSpec, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct PartialGrid {
        cell_width: Option<f64>,
        cell_height: Option<f64>,
        min_spacing: Option<f64>,
    }

    let partial = PartialGrid::deserialize(deserializer)?;
    Ok(GridSpec {
        cell_width: partial.cell_width.unwrap_or(TERMINAL_GRID.cell_width),
        cell_height: partial.cell_height.unwrap_or(TERMINAL_GRID.cell_height),
        min_spacing: partial.min_spacing.unwrap_or(TERMINAL_GRID.min_spacing),
    })
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}
