// Detection thresholds and time-distance policies
//
// The proximity window and cluster-size cut-offs are explicit parameters,
// never constants buried in the clustering code. Defaults reproduce the
// published analysis: 30 minute window, 2/3/4 trip tiers, raw (non-circular)
// minute-of-day distance, calendar date ignored.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::trip::MINUTES_PER_DAY;

/// How the minute-of-day distance between two trips is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistancePolicy {
    /// Plain `|a - b|`; 23:50 and 00:05 are 1430 minutes apart
    #[default]
    Linear,
    /// Wraparound-aware `min(|a - b|, 1440 - |a - b|)`; 23:50 and 00:05 are 15 apart
    Circular,
}

/// Whether the calendar date participates in the proximity test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Only clock time matters; trips on different days can link
    #[default]
    IgnoreDate,
    /// Trips link only to cluster members started on the same calendar date
    SameDay,
}

/// Invalid threshold combination
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min_pattern_size must be >= 2, got {0}")]
    PatternSizeTooSmall(usize),

    #[error("high_threshold ({high}) must be >= min_pattern_size ({min})")]
    HighBelowMinimum { high: usize, min: usize },

    #[error("critical_threshold ({critical}) must be greater than high_threshold ({high})")]
    CriticalNotAboveHigh { critical: usize, high: usize },

    #[error("proximity_minutes must be below 1440, got {0}")]
    WindowTooWide(u32),

    #[error("pattern_id_prefix_len must be > 0")]
    EmptyPatternPrefix,
}

/// Configuration for temporal pattern detection
///
/// # Example
/// ```
/// use ridelink::config::DetectionConfig;
///
/// let config = DetectionConfig::default();
/// assert_eq!(config.proximity_minutes, 30);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum minute-of-day gap for a trip to join a cluster (inclusive)
    pub proximity_minutes: u32,

    /// Smallest cluster reported as a pattern; smaller clusters are dropped
    pub min_pattern_size: usize,

    /// Cluster size at which risk becomes HIGH
    pub high_threshold: usize,

    /// Cluster size at which risk becomes CRITICAL
    pub critical_threshold: usize,

    pub distance_policy: DistancePolicy,

    pub date_policy: DatePolicy,

    /// Number of route-key characters kept in a Pattern_ID
    pub pattern_id_prefix_len: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            proximity_minutes: 30,
            min_pattern_size: 2,
            high_threshold: 3,
            critical_threshold: 4,
            distance_policy: DistancePolicy::Linear,
            date_policy: DatePolicy::IgnoreDate,
            pattern_id_prefix_len: 30,
        }
    }
}

impl DetectionConfig {
    /// Narrow window, same-day linking only. Fewer, tighter patterns.
    pub fn strict() -> Self {
        Self {
            proximity_minutes: 15,
            date_policy: DatePolicy::SameDay,
            ..Self::default()
        }
    }

    /// Wide, wraparound-aware window. Surfaces more candidate patterns.
    pub fn permissive() -> Self {
        Self {
            proximity_minutes: 45,
            distance_policy: DistancePolicy::Circular,
            ..Self::default()
        }
    }

    /// Load a TOML threshold file; absent keys keep their defaults
    ///
    /// # Example TOML
    /// ```toml
    /// proximity_minutes = 20
    /// critical_threshold = 5
    /// distance_policy = "circular"
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;

        let config: DetectionConfig =
            toml::from_str(&content).context("Failed to parse TOML detection config")?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_pattern_size < 2 {
            return Err(ConfigError::PatternSizeTooSmall(self.min_pattern_size));
        }

        if self.high_threshold < self.min_pattern_size {
            return Err(ConfigError::HighBelowMinimum {
                high: self.high_threshold,
                min: self.min_pattern_size,
            });
        }

        if self.critical_threshold <= self.high_threshold {
            return Err(ConfigError::CriticalNotAboveHigh {
                critical: self.critical_threshold,
                high: self.high_threshold,
            });
        }

        if self.proximity_minutes >= MINUTES_PER_DAY {
            return Err(ConfigError::WindowTooWide(self.proximity_minutes));
        }

        if self.pattern_id_prefix_len == 0 {
            return Err(ConfigError::EmptyPatternPrefix);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = DetectionConfig::default();
        assert_eq!(config.proximity_minutes, 30);
        assert_eq!(config.min_pattern_size, 2);
        assert_eq!(config.high_threshold, 3);
        assert_eq!(config.critical_threshold, 4);
        assert_eq!(config.distance_policy, DistancePolicy::Linear);
        assert_eq!(config.date_policy, DatePolicy::IgnoreDate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        let strict = DetectionConfig::strict();
        assert_eq!(strict.proximity_minutes, 15);
        assert_eq!(strict.date_policy, DatePolicy::SameDay);
        assert!(strict.validate().is_ok());

        let permissive = DetectionConfig::permissive();
        assert_eq!(permissive.distance_policy, DistancePolicy::Circular);
        assert!(permissive.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_pattern_size() {
        let mut config = DetectionConfig::default();
        config.min_pattern_size = 1;
        assert_eq!(config.validate(), Err(ConfigError::PatternSizeTooSmall(1)));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_tier_order() {
        let mut config = DetectionConfig::default();
        config.critical_threshold = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CriticalNotAboveHigh { .. })
        ));

        let mut config = DetectionConfig::default();
        config.min_pattern_size = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HighBelowMinimum { .. })
        ));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_window() {
        let mut config = DetectionConfig::default();
        config.proximity_minutes = 1440;
        assert_eq!(config.validate(), Err(ConfigError::WindowTooWide(1440)));
    }

    #[test]
    fn test_from_toml_partial() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
proximity_minutes = 20
distance_policy = "circular"
date_policy = "same_day"
"#
        )?;
        file.flush()?;

        let config = DetectionConfig::from_toml(file.path())?;
        assert_eq!(config.proximity_minutes, 20);
        assert_eq!(config.distance_policy, DistancePolicy::Circular);
        assert_eq!(config.date_policy, DatePolicy::SameDay);
        assert_eq!(config.critical_threshold, 4);
        Ok(())
    }

    #[test]
    fn test_from_toml_rejects_invalid_thresholds() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "high_threshold = 5\ncritical_threshold = 5").unwrap();
        file.flush().unwrap();

        let result = DetectionConfig::from_toml(file.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("critical_threshold"));
    }

    #[test]
    fn test_from_toml_missing_file() {
        let result = DetectionConfig::from_toml("/nonexistent/ridelink.toml");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file"));
    }
}
