//! Events delivered by transport and device collaborators

use serde::{Deserialize, Serialize};

use super::ImuSample;
use crate::{Result, TelemetryError};

/// One unit of input to the pipeline.
///
/// Providers yield these in arrival order; the pipeline processes each one to
/// completion before the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEvent {
    /// Raw receiver bytes carrying interleaved sentences and correction frames
    Receiver(Vec<u8>),

    /// Bytes from a stream that carries only correction frames
    Corrections(Vec<u8>),

    /// One complete position sentence, line delimiter already stripped
    Sentence(String),

    /// One inertial/magnetic sample from the sensor driver
    Imu(ImuSample),
}

impl SourceEvent {
    /// Short label used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceEvent::Receiver(_) => "receiver",
            SourceEvent::Corrections(_) => "corrections",
            SourceEvent::Sentence(_) => "sentence",
            SourceEvent::Imu(_) => "imu",
        }
    }
}

/// An ordered sequence of [`SourceEvent`]s as stored in a replay log.
///
/// Each entry is a single-key map naming the event kind:
///
/// ```yaml
/// - receiver: [211, 0, 0, 71, 234, 75]
/// - sentence: "$GNGGA,123519,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47"
/// - imu: { accel: [0.0, 0.0, 1.0], gyro: [0.0, 0.0, 0.0], mag: [0.3, 0.0, -0.5] }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    #[serde(with = "serde_yaml_ng::with::singleton_map_recursive")]
    pub events: Vec<SourceEvent>,
}

impl EventLog {
    pub fn new(events: Vec<SourceEvent>) -> Self {
        Self { events }
    }

    /// Parse a YAML log.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| TelemetryError::parse_error("Replay log", e.to_string()))
    }

    /// Render the log in the same layout [`from_yaml_str`](Self::from_yaml_str) reads.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| TelemetryError::parse_error("Replay log", e.to_string()))
    }
}

impl From<Vec<SourceEvent>> for EventLog {
    fn from(events: Vec<SourceEvent>) -> Self {
        Self::new(events)
    }
}
