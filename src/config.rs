//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! analysis section falls back to the component defaults, so an empty file
//! (or no file at all) reproduces the stock thresholds.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::strategy::allocation::AllocationConfig;
use crate::strategy::patterns::PatternConfig;
use crate::strategy::signal::SignalConfig;
use crate::types::BlitzError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    /// Days of results kept in the corpus, counted back from its newest
    /// race. Older races are pruned before statistics are rebuilt.
    pub collection_days: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "BlitzBoat".to_string(),
            collection_days: 180,
        }
    }
}

/// File locations. Relative names are resolved against `data_dir`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub history_file: String,
    pub stats_file: String,
    pub progress_file: String,
    /// Plain-text cross-venue probability table.
    pub table_file: String,
    pub daily_dir: String,
    /// Raw race snapshots of the day to analyse.
    pub snapshot_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            history_file: "race_results.json".to_string(),
            stats_file: "venue_stats.json".to_string(),
            progress_file: "progress.json".to_string(),
            table_file: "probability_table.txt".to_string(),
            daily_dir: "daily".to_string(),
            snapshot_file: "snapshot.json".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn history(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    pub fn stats(&self) -> PathBuf {
        self.data_dir.join(&self.stats_file)
    }

    pub fn progress(&self) -> PathBuf {
        self.data_dir.join(&self.progress_file)
    }

    pub fn table(&self) -> PathBuf {
        self.data_dir.join(&self.table_file)
    }

    pub fn daily_dir(&self) -> PathBuf {
        self.data_dir.join(&self.daily_dir)
    }

    pub fn snapshot(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Load from `path` when it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the analysis cannot run with.
    pub fn validate(&self) -> Result<(), BlitzError> {
        if self.agent.collection_days == 0 {
            return Err(BlitzError::Config("agent.collection_days must be at least 1".into()));
        }

        let s = &self.signal;
        if !(s.national_rate_threshold.is_finite()
            && s.rate_diff_threshold.is_finite()
            && s.st_slow_threshold.is_finite()
            && s.st_slow_threshold > 0.0)
        {
            return Err(BlitzError::Config(
                "signal thresholds must be finite and st_slow_threshold positive".into(),
            ));
        }
        if s.min_history < 2 {
            return Err(BlitzError::Config(format!(
                "signal.min_history must be at least 2, got {}",
                s.min_history
            )));
        }

        let c = self.patterns.cumulative_cutoff;
        if !(c > 0.0 && c <= 1.0) {
            return Err(BlitzError::Config(format!(
                "patterns.cumulative_cutoff must be in (0, 1], got {c}"
            )));
        }
        if self.patterns.allowed.iter().any(|a| !(1..=6).contains(&a.lane)) {
            return Err(BlitzError::Config("patterns.allowed lanes must be 1-6".into()));
        }

        let a = &self.allocation;
        if a.unit == 0 {
            return Err(BlitzError::Config("allocation.unit must be positive".into()));
        }
        if a.budget < a.unit || a.budget % a.unit != 0 {
            return Err(BlitzError::Config(format!(
                "allocation.budget ({}) must be a positive multiple of unit ({})",
                a.budget, a.unit
            )));
        }
        Ok(())
    }
}
