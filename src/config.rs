//! Pipeline configuration.
//!
//! Configuration is plain serde data, usually loaded from YAML. Every section
//! and field has a default, so an empty document is a valid configuration.
//!
//! ```rust
//! use navfusion::config::{FixPolicy, PipelineConfig};
//!
//! let config = PipelineConfig::from_yaml_str(
//!     r#"
//! filter:
//!   gain: 0.05
//!   sample_rate_hz: 50.0
//! sentences:
//!   fix_policy: satellite_count
//! aggregator:
//!   tick_interval_ms: 200
//! "#,
//! )?;
//!
//! assert_eq!(config.sentences.fix_policy, FixPolicy::SatelliteCount);
//! assert_eq!(config.aggregator.tick_interval().as_millis(), 200);
//! # Ok::<(), navfusion::TelemetryError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::{Result, TelemetryError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub filter: FilterConfig,
    pub sentences: SentenceConfig,
    pub aggregator: AggregatorConfig,
    pub replay: ReplayConfig,
}

impl PipelineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml_ng::from_str(yaml)
            .map_err(|e| TelemetryError::parse_error("Pipeline configuration", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&yaml)
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()?;
        self.aggregator.validate()?;
        self.replay.validate()
    }
}

/// Orientation filter tuning, fixed for the filter's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Gradient-descent step gain (beta)
    pub gain: f64,
    /// Expected sample frequency in Hz
    pub sample_rate_hz: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { gain: 0.1, sample_rate_hz: 100.0 }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(TelemetryError::config_error(
                "filter.gain",
                format!("must be finite and non-negative, got {}", self.gain),
            ));
        }
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(TelemetryError::config_error(
                "filter.sample_rate_hz",
                format!("must be finite and positive, got {}", self.sample_rate_hz),
            ));
        }
        Ok(())
    }

    /// Integration step in seconds.
    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate_hz
    }
}

/// How fix quality is derived from a sentence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixPolicy {
    /// Trust the explicit fix-quality field
    #[default]
    QualityField,
    /// Infer from the number of satellites in use
    SatelliteCount,
}

/// Position sentence decoding options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentenceConfig {
    pub fix_policy: FixPolicy,
    /// Reject lines whose `*hh` checksum is missing or wrong
    pub verify_checksum: bool,
}

/// Snapshot aggregation cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregatorConfig {
    pub tick_interval_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { tick_interval_ms: 1000 }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(TelemetryError::config_error(
                "aggregator.tick_interval_ms",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Snapshots per second.
    pub fn tick_hz(&self) -> f64 {
        1000.0 / self.tick_interval_ms as f64
    }
}

/// Replay log playback options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    /// Playback speed multiplier, clamped to 0.1..=10.0
    pub speed: f64,
    /// Pace events at the filter sample rate; unpaced replays run flat out
    pub paced: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { speed: 1.0, paced: true }
    }
}

impl ReplayConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(TelemetryError::config_error(
                "replay.speed",
                format!("must be finite and positive, got {}", self.speed),
            ));
        }
        Ok(())
    }

    pub fn clamped_speed(&self) -> f64 {
        self.speed.clamp(0.1, 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = PipelineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.filter.gain, 0.1);
        assert_eq!(config.filter.sample_rate_hz, 100.0);
        assert_eq!(config.aggregator.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.sentences.fix_policy, FixPolicy::QualityField);
        assert!(!config.sentences.verify_checksum);
        assert!(config.replay.paced);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PipelineConfig::from_yaml_str("filter:\n  gain: 0.5\n").unwrap();
        assert_eq!(config.filter.gain, 0.5);
        assert_eq!(config.filter.sample_rate_hz, 100.0);
        assert!((config.filter.sample_period() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = PipelineConfig::from_yaml_str("filter:\n  sample_rate_hz: 0\n").unwrap_err();
        assert!(matches!(err, TelemetryError::Config { ref field, .. } if field == "filter.sample_rate_hz"));

        let err = PipelineConfig::from_yaml_str("filter:\n  gain: -1\n").unwrap_err();
        assert!(matches!(err, TelemetryError::Config { ref field, .. } if field == "filter.gain"));

        let err = PipelineConfig::from_yaml_str("aggregator:\n  tick_interval_ms: 0\n").unwrap_err();
        assert!(matches!(err, TelemetryError::Config { .. }));

        let err = PipelineConfig::from_yaml_str("replay:\n  speed: 0\n").unwrap_err();
        assert!(matches!(err, TelemetryError::Config { .. }));
    }

    #[test]
    fn unknown_fields_are_parse_errors() {
        let err = PipelineConfig::from_yaml_str("filter:\n  beta: 0.1\n").unwrap_err();
        assert!(matches!(err, TelemetryError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_file_error() {
        let err = PipelineConfig::from_file("/nonexistent/navfusion.yaml").unwrap_err();
        assert!(matches!(err, TelemetryError::File { .. }));
    }

    #[test]
    fn tick_rate_and_speed_helpers() {
        let aggregator = AggregatorConfig { tick_interval_ms: 250 };
        assert_eq!(aggregator.tick_hz(), 4.0);

        let replay = ReplayConfig { speed: 50.0, paced: true };
        assert_eq!(replay.clamped_speed(), 10.0);
    }
}
