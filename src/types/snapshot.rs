//! Aggregated telemetry snapshot

use serde::{Deserialize, Serialize};

use super::{FixRecord, ImuSample};
use crate::ahrs::OrientationState;

/// Immutable composition of the latest fix, orientation and sensor sample.
///
/// A fresh snapshot is built on every aggregation tick and handed to the
/// presentation layer behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Aggregation tick counter, starting at 1
    pub tick: u64,

    /// Latest position fix
    pub fix: FixRecord,

    /// Latest attitude estimate
    pub orientation: OrientationState,

    /// Most recent raw sensor sample, if any arrived yet
    pub imu: Option<ImuSample>,
}
