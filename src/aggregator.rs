//! Periodic snapshot composition

use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use crate::ahrs::OrientationState;
use crate::config::AggregatorConfig;
use crate::types::{FixRecord, ImuSample, TelemetrySnapshot};

/// Composes the latest fix, orientation and sensor sample into snapshots.
///
/// The aggregator does no decoding. It only remembers the most recent
/// [`ImuSample`] and numbers the snapshots it builds.
#[derive(Debug, Clone)]
pub struct TelemetryAggregator {
    tick_interval: Duration,
    ticks: u64,
    last_imu: Option<ImuSample>,
}

impl TelemetryAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { tick_interval: config.tick_interval(), ticks: 0, last_imu: None }
    }

    /// Remember the most recent sensor sample, degenerate or not.
    pub fn observe_sample(&mut self, sample: ImuSample) {
        self.last_imu = Some(sample);
    }

    /// Build the next snapshot from read-only views of the current state.
    pub fn compose(
        &mut self,
        fix: &FixRecord,
        orientation: &OrientationState,
    ) -> Arc<TelemetrySnapshot> {
        self.ticks += 1;
        trace!("Composing snapshot {}", self.ticks);
        Arc::new(TelemetrySnapshot {
            tick: self.ticks,
            fix: *fix,
            orientation: *orientation,
            imu: self.last_imu,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Snapshot frequency in Hz.
    pub fn tick_hz(&self) -> f64 {
        1.0 / self.tick_interval.as_secs_f64()
    }

    /// Snapshots composed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::level_sample;
    use crate::types::FixQuality;

    #[test]
    fn ticks_increase_monotonically() {
        let mut aggregator = TelemetryAggregator::new(AggregatorConfig::default());
        let fix = FixRecord::default();
        let orientation = OrientationState::identity();

        let first = aggregator.compose(&fix, &orientation);
        let second = aggregator.compose(&fix, &orientation);
        assert_eq!(first.tick, 1);
        assert_eq!(second.tick, 2);
        assert!(first.imu.is_none());
        assert_eq!(aggregator.tick_hz(), 1.0);
    }

    #[test]
    fn snapshot_is_a_copy_of_its_inputs() {
        let mut aggregator = TelemetryAggregator::new(AggregatorConfig { tick_interval_ms: 100 });
        let mut fix = FixRecord { latitude: Some(48.1173), quality: FixQuality::RtkFix, ..FixRecord::default() };
        aggregator.observe_sample(level_sample());

        let snapshot = aggregator.compose(&fix, &OrientationState::identity());
        fix.latitude = Some(0.0);

        assert_eq!(snapshot.fix.latitude, Some(48.1173));
        assert_eq!(snapshot.fix.quality, FixQuality::RtkFix);
        assert_eq!(snapshot.imu, Some(level_sample()));
        assert_eq!(aggregator.tick_interval(), Duration::from_millis(100));
    }
}
