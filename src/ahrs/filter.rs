//! Stateful wrapper around the pure fusion transition

use tracing::debug;

use super::{Degenerate, OrientationState};
use crate::Result;
use crate::config::FilterConfig;
use crate::types::ImuSample;

/// Result of feeding one sample to an [`OrientationFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The quaternion moved to a new unit-norm value
    Applied,
    /// The sample was skipped and the quaternion is unchanged
    Rejected(Degenerate),
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied)
    }
}

/// Owns the current attitude and applies samples strictly in order.
#[derive(Debug, Clone)]
pub struct OrientationFilter {
    config: FilterConfig,
    state: OrientationState,
    applied: u64,
    rejected: u64,
}

impl OrientationFilter {
    /// Create a filter at the identity orientation.
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, state: OrientationState::identity(), applied: 0, rejected: 0 })
    }

    pub fn update(&mut self, sample: &ImuSample) -> UpdateOutcome {
        match self.state.fuse(sample, &self.config) {
            Ok(next) => {
                self.state = next;
                self.applied += 1;
                UpdateOutcome::Applied
            }
            Err(reason) => {
                self.rejected += 1;
                debug!(%reason, "Skipped orientation update");
                UpdateOutcome::Rejected(reason)
            }
        }
    }

    pub fn state(&self) -> &OrientationState {
        &self.state
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Return to the identity orientation. Counters are kept.
    pub fn reset(&mut self) {
        self.state = OrientationState::identity();
    }

    /// Applied and rejected update counts.
    pub fn counts(&self) -> (u64, u64) {
        (self.applied, self.rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TelemetryError;
    use crate::test_utils::level_sample;
    use nalgebra::Vector3;

    #[test]
    fn invalid_config_is_refused() {
        let config = FilterConfig { gain: 0.1, sample_rate_hz: 0.0 };
        assert!(matches!(OrientationFilter::new(config), Err(TelemetryError::Config { .. })));
    }

    #[test]
    fn degenerate_sample_leaves_state_bit_identical() {
        let mut filter = OrientationFilter::new(FilterConfig::default()).unwrap();
        let mut turning = level_sample();
        turning.gyro = Vector3::new(10.0, -20.0, 30.0);
        for _ in 0..10 {
            assert_eq!(filter.update(&turning), UpdateOutcome::Applied);
        }
        let before = filter.state().quaternion();

        let mut bad = turning;
        bad.accel = Vector3::zeros();
        assert_eq!(filter.update(&bad), UpdateOutcome::Rejected(Degenerate::ZeroAcceleration));

        let after = filter.state().quaternion();
        assert_eq!(before.coords.map(f64::to_bits), after.coords.map(f64::to_bits));
        assert_eq!(filter.counts(), (10, 1));
    }

    #[test]
    fn reset_restores_identity() {
        let mut filter = OrientationFilter::new(FilterConfig::default()).unwrap();
        let mut sample = level_sample();
        sample.gyro = Vector3::new(0.0, 45.0, 0.0);
        assert!(filter.update(&sample).is_applied());
        assert_ne!(*filter.state(), OrientationState::identity());

        filter.reset();
        assert_eq!(*filter.state(), OrientationState::identity());
    }
}
