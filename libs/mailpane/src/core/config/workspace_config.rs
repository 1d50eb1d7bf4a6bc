// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Workspace-level configuration via `mailpane.yaml`.

use crate::core::{DependencyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Audit log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum number of audit entries retained (oldest evicted first).
    pub capacity: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

/// Link suggestion tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// A component pair must have been linked at least this many times.
    pub min_frequency: u32,
    /// Confidence gained per observed link.
    pub confidence_step: f64,
    /// Upper bound on suggestion confidence.
    pub max_confidence: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_frequency: 2,
            confidence_step: 0.1,
            max_confidence: 0.9,
        }
    }
}

impl SuggestionConfig {
    pub fn confidence(&self, frequency: u32) -> f64 {
        (self.confidence_step * f64::from(frequency)).min(self.max_confidence)
    }
}

/// Runtime manager settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Timeout applied to pull requests. `None` waits indefinitely.
    pub pull_timeout_ms: Option<u64>,
}

impl RuntimeConfig {
    pub fn pull_timeout(&self) -> Option<Duration> {
        self.pull_timeout_ms.map(Duration::from_millis)
    }
}

/// The subset of configuration the link graph needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphConfig {
    pub logging: LoggingConfig,
    pub suggestions: SuggestionConfig,
}

/// Workspace configuration from `mailpane.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub logging: LoggingConfig,
    pub suggestions: SuggestionConfig,
    pub runtime: RuntimeConfig,
}

impl WorkspaceConfig {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "mailpane.yaml";

    /// Load configuration from a directory. Returns error if the file is
    /// missing, cannot be parsed, or holds out-of-range values.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            DependencyError::Configuration(format!(
                "Failed to read {}: {}",
                config_path.display(),
                e
            ))
        })?;

        let config = Self::from_yaml_str(&content).map_err(|e| {
            DependencyError::Configuration(format!("{}: {}", config_path.display(), e))
        })?;

        tracing::info!("Loaded workspace config from {}", config_path.display());
        Ok(config)
    }

    /// Load configuration from a directory, returning defaults if the file is
    /// missing or invalid.
    pub fn load_or_default(dir: &Path) -> Self {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!(
                "No {} found in {}, using defaults",
                Self::FILE_NAME,
                dir.display()
            );
            return Self::default();
        }

        match Self::load(dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| DependencyError::Configuration(format!("Failed to parse: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.logging.capacity == 0 {
            return Err(DependencyError::Configuration(
                "logging.capacity must be greater than zero".into(),
            ));
        }
        let s = &self.suggestions;
        if !(0.0..=1.0).contains(&s.max_confidence) {
            return Err(DependencyError::Configuration(format!(
                "suggestions.max_confidence must be within [0, 1], got {}",
                s.max_confidence
            )));
        }
        if s.confidence_step <= 0.0 {
            return Err(DependencyError::Configuration(format!(
                "suggestions.confidence_step must be positive, got {}",
                s.confidence_step
            )));
        }
        if s.min_frequency == 0 {
            return Err(DependencyError::Configuration(
                "suggestions.min_frequency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn graph(&self) -> GraphConfig {
        GraphConfig {
            logging: self.logging.clone(),
            suggestions: self.suggestions.clone(),
        }
    }
}
