//! Driver spawns and manages the pipeline task

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::Result;
use crate::config::PipelineConfig;
use crate::pipeline::{Pipeline, PipelineEvent, PipelineStats};
use crate::provider::Provider;
use crate::rtcm::ClassifiedMessage;
use crate::types::{FixRecord, TelemetrySnapshot};

/// Consecutive provider errors tolerated before the driver stops.
pub const MAX_PROVIDER_ERRORS: u32 = 10;

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for aggregated snapshots, `None` until the first tick
    pub snapshots: watch::Receiver<Option<Arc<TelemetrySnapshot>>>,
    /// Receiver for the latest accepted fix
    pub fixes: watch::Receiver<Option<FixRecord>>,
    /// Receiver for pipeline counters, refreshed every tick
    pub stats: watch::Receiver<PipelineStats>,
    /// Every classified correction message, in stream order
    pub corrections: mpsc::UnboundedReceiver<ClassifiedMessage>,
    /// Snapshot rate in Hz
    pub tick_hz: f64,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

struct Outputs {
    snapshots: watch::Sender<Option<Arc<TelemetrySnapshot>>>,
    fixes: watch::Sender<Option<FixRecord>>,
    stats: watch::Sender<PipelineStats>,
    corrections: mpsc::UnboundedSender<ClassifiedMessage>,
}

/// Driver spawns and manages the pipeline task
///
/// One task owns both the provider and the [`Pipeline`]. It multiplexes
/// provider events with the aggregation timer, so each handler runs to
/// completion before the next event is looked at.
pub struct Driver;

impl Driver {
    /// Spawn the pipeline task for the given provider
    ///
    /// Fails only if the configuration is invalid. Must be called from within
    /// a tokio runtime.
    pub fn spawn<P>(provider: P, config: &PipelineConfig) -> Result<DriverChannels>
    where
        P: Provider,
    {
        let pipeline = Pipeline::new(config)?;
        let tick_hz = pipeline.aggregator().tick_hz();

        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (fix_tx, fix_rx) = watch::channel(None);
        let (stats_tx, stats_rx) = watch::channel(PipelineStats::default());
        let (correction_tx, correction_rx) = mpsc::unbounded_channel();

        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let outputs = Outputs {
            snapshots: snapshot_tx,
            fixes: fix_tx,
            stats: stats_tx,
            corrections: correction_tx,
        };

        tokio::spawn(async move {
            Self::pipeline_task(provider, pipeline, outputs, cancel_task).await;
        });

        Ok(DriverChannels {
            snapshots: snapshot_rx,
            fixes: fix_rx,
            stats: stats_rx,
            corrections: correction_rx,
            tick_hz,
            cancel,
        })
    }

    /// Pipeline task - routes events and composes snapshots on each tick
    async fn pipeline_task<P>(
        mut provider: P,
        mut pipeline: Pipeline,
        outputs: Outputs,
        cancel: CancellationToken,
    ) where
        P: Provider,
    {
        info!("Pipeline task started ({}Hz source)", provider.sample_rate_hz());
        let mut event_count = 0u64;
        let mut error_count = 0u32;

        let period = pipeline.aggregator().tick_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Pipeline task cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    if !Self::publish_snapshot(&mut pipeline, &outputs) {
                        debug!("Snapshot receiver dropped, shutting down");
                        break;
                    }
                    continue;
                }
                result = provider.next_event() => result,
            };

            match result {
                Ok(Some(event)) => {
                    event_count += 1;
                    error_count = 0;
                    for output in pipeline.handle(event) {
                        Self::route(output, &outputs);
                    }
                }
                Ok(None) => {
                    info!("Provider stream ended after {} events", event_count);
                    Self::publish_snapshot(&mut pipeline, &outputs);
                    break;
                }
                Err(e) => {
                    // Provider error - don't crash on transient failures
                    error_count += 1;
                    error!("Provider error ({}/{}): {}", error_count, MAX_PROVIDER_ERRORS, e);

                    if error_count >= MAX_PROVIDER_ERRORS {
                        error!("Too many provider errors, shutting down");
                        Self::publish_snapshot(&mut pipeline, &outputs);
                        break;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ...
                    let backoff = std::time::Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        info!("Pipeline task ended (processed {} events)", event_count);
    }

    fn route(output: PipelineEvent, outputs: &Outputs) {
        match output {
            PipelineEvent::Correction(message) => {
                trace!("Correction message {}", message.id());
                // Nobody listening for corrections is not an error.
                let _ = outputs.corrections.send(message);
            }
            PipelineEvent::FixUpdated(fix) => {
                outputs.fixes.send_replace(Some(fix));
            }
            PipelineEvent::OrientationUpdated(_) => {}
        }
    }

    /// Returns false once every snapshot receiver is gone.
    fn publish_snapshot(pipeline: &mut Pipeline, outputs: &Outputs) -> bool {
        let snapshot = pipeline.tick();
        trace!("Snapshot {}", snapshot.tick);
        outputs.stats.send_replace(pipeline.stats());
        outputs.snapshots.send(Some(snapshot)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TelemetryError;
    use crate::config::ReplayConfig;
    use crate::providers::{ChannelProvider, ReplayProvider};
    use crate::test_utils::{frame_bytes, level_sample, msm_payload};
    use crate::types::SourceEvent;
    use std::time::Duration;

    const GGA: &str = "$GNGGA,123519,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47";

    fn config(tick_interval_ms: u64) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.aggregator.tick_interval_ms = tick_interval_ms;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_publish_snapshots_and_stats() {
        let _ = tracing_subscriber::fmt::try_init();
        let (provider, handle) = ChannelProvider::new(100.0);
        let mut channels = Driver::spawn(provider, &config(100)).unwrap();
        assert_eq!(channels.tick_hz, 10.0);

        handle.sentence(GGA).await.unwrap();
        handle.imu(level_sample()).await.unwrap();

        channels.snapshots.changed().await.unwrap();
        let snapshot = channels.snapshots.borrow().clone().unwrap();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.fix.satellites, Some(8));
        assert_eq!(snapshot.imu, Some(level_sample()));

        assert_eq!(channels.fixes.borrow().unwrap().satellites, Some(8));
        assert_eq!(channels.stats.borrow().sentences.accepted, 1);
        channels.cancel.cancel();
    }

    #[tokio::test]
    async fn corrections_are_delivered_in_order() {
        let (provider, handle) = ChannelProvider::new(100.0);
        let mut channels = Driver::spawn(provider, &config(1000)).unwrap();

        let mut wire = frame_bytes(&msm_payload(1077, 20));
        wire.extend(frame_bytes(&msm_payload(1087, 20)));
        wire.extend(frame_bytes(&msm_payload(1005, 19)));
        for chunk in wire.chunks(5) {
            handle.correction_bytes(chunk.to_vec()).await.unwrap();
        }
        drop(handle);

        let mut ids = Vec::new();
        while let Some(message) = channels.corrections.recv().await {
            ids.push(message.id());
        }
        assert_eq!(ids, vec![1077, 1087, 1005]);
    }

    #[tokio::test]
    async fn end_of_stream_publishes_final_snapshot() {
        let events = vec![SourceEvent::Sentence(GGA.into()), SourceEvent::Imu(level_sample())];
        let replay = ReplayConfig { speed: 1.0, paced: false };
        let provider = ReplayProvider::from_events(events, 100.0, &replay).unwrap();
        let mut channels = Driver::spawn(provider, &config(60_000)).unwrap();

        // Sender is dropped after the final publish.
        while channels.snapshots.changed().await.is_ok() {}
        let snapshot = channels.snapshots.borrow().clone().unwrap();
        assert_eq!(snapshot.fix.latitude.map(|l| (l * 1e4).round()), Some(481173.0));
        assert_eq!(channels.stats.borrow().imu_applied, 1);
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl Provider for FailingProvider {
        async fn next_event(&mut self) -> Result<Option<SourceEvent>> {
            Err(TelemetryError::source_failed("device unplugged"))
        }

        fn sample_rate_hz(&self) -> f64 {
            100.0
        }
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_provider_errors_stop_the_driver() {
        let mut channels = Driver::spawn(FailingProvider, &config(3_600_000)).unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(60), async {
            while channels.snapshots.changed().await.is_ok() {}
        })
        .await;
        assert!(stopped.is_ok(), "driver should stop after {} errors", MAX_PROVIDER_ERRORS);
    }

    #[test]
    fn invalid_config_fails_spawn() {
        let (provider, _handle) = ChannelProvider::new(100.0);
        let mut bad = PipelineConfig::default();
        bad.filter.sample_rate_hz = -1.0;
        assert!(matches!(Driver::spawn(provider, &bad), Err(TelemetryError::Config { .. })));
    }
}
