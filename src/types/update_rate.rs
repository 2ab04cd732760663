//! Delivery rate control for snapshot streams

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rate at which a subscriber wants snapshots delivered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every aggregation tick
    Native,

    /// At most this many snapshots per second.
    /// Rates at or above the aggregation rate collapse to `Native`.
    Max(u32),
}

impl UpdateRate {
    /// Normalize against the aggregation rate in Hz
    pub fn normalize(self, tick_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(0) => UpdateRate::Native,
            UpdateRate::Max(hz) if hz as f64 >= tick_hz => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Throttle interval, if the rate is below the aggregation rate
    pub fn throttle_interval(self, tick_hz: f64) -> Option<Duration> {
        match self.normalize(tick_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
