use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::TimelineError;

/// `[timeline]` block: window and bucket sizes.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TimelineSettings {
    pub segment_minutes: u32,
    pub chunk_minutes: u32,
    /// Display window when no end time is given.
    pub window_minutes: u32,
    /// Segment bar range when no end time is given.
    pub range_hours: u32,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            segment_minutes: 5,
            chunk_minutes: 30,
            window_minutes: 5,
            range_hours: 24,
        }
    }
}

/// `[search]` block.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

/// Top-level settings file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub timeline: TimelineSettings,
    pub search: SearchSettings,
}

impl Settings {
    pub fn segment_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.timeline.segment_minutes))
    }

    pub fn chunk_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.timeline.chunk_minutes))
    }

    pub fn window(&self) -> Duration {
        Duration::minutes(i64::from(self.timeline.window_minutes))
    }

    pub fn range(&self) -> Duration {
        Duration::hours(i64::from(self.timeline.range_hours))
    }

    pub fn debounce_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search.debounce_ms)
    }

    /// Every duration must be strictly positive.
    pub fn validate(&self) -> Result<(), TimelineError> {
        let checks = [
            ("timeline.segment_minutes", u64::from(self.timeline.segment_minutes)),
            ("timeline.chunk_minutes", u64::from(self.timeline.chunk_minutes)),
            ("timeline.window_minutes", u64::from(self.timeline.window_minutes)),
            ("timeline.range_hours", u64::from(self.timeline.range_hours)),
            ("search.debounce_ms", self.search.debounce_ms),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(TimelineError::InvalidSetting {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Update one dotted key, e.g. `timeline.segment_minutes`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), TimelineError> {
        let mut updated = self.clone();
        match key {
            "timeline.segment_minutes" => updated.timeline.segment_minutes = parse_value(key, value)?,
            "timeline.chunk_minutes" => updated.timeline.chunk_minutes = parse_value(key, value)?,
            "timeline.window_minutes" => updated.timeline.window_minutes = parse_value(key, value)?,
            "timeline.range_hours" => updated.timeline.range_hours = parse_value(key, value)?,
            "search.debounce_ms" => updated.search.debounce_ms = parse_value(key, value)?,
            _ => return Err(TimelineError::UnknownSetting(key.to_string())),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Render as TOML for `memtl config show`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings")
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, TimelineError> {
    value.trim().parse().map_err(|_| TimelineError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })
}

/// Loads and saves [`Settings`] at an explicit path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at ~/.memtl/config.toml
    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns defaults if the file doesn't exist.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings: {}", self.path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", self.path.display()))?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&self.path, settings.to_toml()?)
            .with_context(|| format!("Failed to write settings: {}", self.path.display()))?;
        info!("Saved settings: {}", self.path.display());
        Ok(())
    }

    /// Write the default settings if no file exists yet. Returns whether it wrote.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&Settings::default())?;
        Ok(true)
    }
}

/// Path to the settings file: ~/.memtl/config.toml
pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".memtl").join("config.toml"))
}
