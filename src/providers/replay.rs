//! Replay provider for recorded event logs

use std::collections::VecDeque;
use std::path::Path;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::config::ReplayConfig;
use crate::provider::Provider;
use crate::types::{EventLog, SourceEvent};
use crate::{Result, TelemetryError};

/// Replay provider that plays back a YAML event log
///
/// The log is a YAML sequence of [`SourceEvent`]s laid out as an [`EventLog`].
///
/// When paced, IMU samples are released one per sample period (scaled by the
/// playback speed) and every other event is released immediately. Unpaced
/// replays run as fast as the driver consumes them.
#[derive(Debug)]
pub struct ReplayProvider {
    /// Remaining events
    events: VecDeque<SourceEvent>,

    /// Events at load time
    total: usize,

    /// Playback speed multiplier (1.0 = recorded rate)
    speed: f64,

    /// IMU pacing period, `None` when unpaced
    period: Option<Duration>,

    /// Created on first use so construction needs no runtime
    interval: Option<Interval>,

    /// Recorded IMU sample rate
    sample_rate_hz: f64,
}

impl ReplayProvider {
    /// Load a replay log from disk.
    pub fn open<P: AsRef<Path>>(
        path: P,
        sample_rate_hz: f64,
        config: &ReplayConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        let provider = Self::from_yaml_str(&yaml, sample_rate_hz, config)?;
        info!(
            "Opened replay log {}: {} events at {}Hz",
            path.display(),
            provider.total,
            sample_rate_hz
        );
        Ok(provider)
    }

    /// Parse a replay log held in memory.
    pub fn from_yaml_str(yaml: &str, sample_rate_hz: f64, config: &ReplayConfig) -> Result<Self> {
        let log = EventLog::from_yaml_str(yaml)?;
        Self::from_events(log.events, sample_rate_hz, config)
    }

    /// Replay an in-memory event sequence.
    pub fn from_events(
        events: impl IntoIterator<Item = SourceEvent>,
        sample_rate_hz: f64,
        config: &ReplayConfig,
    ) -> Result<Self> {
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(TelemetryError::config_error(
                "sample_rate_hz",
                format!("must be finite and positive, got {}", sample_rate_hz),
            ));
        }
        config.validate()?;

        let events: VecDeque<SourceEvent> = events.into_iter().collect();
        let total = events.len();
        let mut provider =
            Self { events, total, speed: 1.0, period: None, interval: None, sample_rate_hz };

        if config.paced {
            provider.set_speed(config.speed);
        }
        Ok(provider)
    }

    /// Set playback speed, clamped to 0.1..=10.0. Enables pacing.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_nan() { 1.0 } else { speed.clamp(0.1, 10.0) };

        self.period = Some(Duration::from_secs_f64(1.0 / (self.sample_rate_hz * self.speed)));
        self.interval = None;

        debug!("Playback speed set to {}x", self.speed);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_paced(&self) -> bool {
        self.period.is_some()
    }

    /// Events not yet delivered.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

#[async_trait::async_trait]
impl Provider for ReplayProvider {
    async fn next_event(&mut self) -> Result<Option<SourceEvent>> {
        let is_sample = match self.events.front() {
            Some(event) => matches!(event, SourceEvent::Imu(_)),
            None => {
                debug!("Reached end of replay");
                return Ok(None);
            }
        };

        // Pop only after the tick so a cancelled wait loses nothing.
        if let Some(period) = self.period.filter(|_| is_sample) {
            let pacer = self.interval.get_or_insert_with(|| {
                let mut pacer = interval(period);
                pacer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                pacer
            });
            pacer.tick().await;
        }

        let event = self.events.pop_front();
        if let Some(event) = &event {
            let position = self.total - self.events.len();
            trace!("Replay event {}/{}: {}", position, self.total, event.kind());
        }
        Ok(event)
    }

    fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
}
