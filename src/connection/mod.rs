//! Subscriber-facing connection to a running pipeline
//!
//! A [`TelemetryConnection`] wraps the channels published by the
//! [`Driver`]. Snapshot and fix streams use watch channels with latest-wins
//! semantics; correction messages are delivered unthrottled and in order.

use futures::{Stream, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::{UnboundedReceiverStream, WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::driver::Driver;
use crate::pipeline::PipelineStats;
use crate::provider::Provider;
use crate::providers::ReplayProvider;
use crate::rtcm::ClassifiedMessage;
use crate::stream::ThrottleExt;
use crate::types::{FixRecord, TelemetrySnapshot, UpdateRate};
use crate::{Result, TelemetryError};


/// Handle to a spawned pipeline. Dropping it stops the pipeline task.
pub struct TelemetryConnection {
    /// Snapshot watch receiver
    snapshots: watch::Receiver<Option<Arc<TelemetrySnapshot>>>,

    /// Fix watch receiver
    fixes: watch::Receiver<Option<FixRecord>>,

    /// Counter watch receiver
    stats: watch::Receiver<PipelineStats>,

    /// Correction messages until claimed by [`take_corrections`](Self::take_corrections)
    corrections: Option<mpsc::UnboundedReceiver<ClassifiedMessage>>,

    /// Snapshot frequency
    tick_hz: f64,

    /// Cancellation token for stopping the pipeline task
    cancel: CancellationToken,
}

impl TelemetryConnection {
    /// Spawn a pipeline over any provider.
    ///
    /// Must be called within a tokio runtime.
    pub fn with_provider<P: Provider>(provider: P, config: &PipelineConfig) -> Result<Self> {
        let channels = Driver::spawn(provider, config)?;
        info!("Telemetry connection attached ({}Hz snapshots)", channels.tick_hz);

        Ok(Self {
            snapshots: channels.snapshots,
            fixes: channels.fixes,
            stats: channels.stats,
            corrections: Some(channels.corrections),
            tick_hz: channels.tick_hz,
            cancel: channels.cancel,
        })
    }

    /// Replay a recorded YAML event log, paced per `config.replay`.
    pub async fn open_replay<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<Self> {
        let provider = ReplayProvider::open(path, config.filter.sample_rate_hz, &config.replay)?;
        Self::with_provider(provider, config)
    }

    /// Subscribe to aggregated snapshots
    ///
    /// `UpdateRate::Native` yields every tick; `UpdateRate::Max(hz)` below the
    /// tick rate keeps only the newest snapshot per period.
    pub fn snapshots(
        &self,
        rate: UpdateRate,
    ) -> impl Stream<Item = Arc<TelemetrySnapshot>> + 'static {
        let snapshots =
            WatchStream::new(self.snapshots.clone()).filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.tick_hz) {
            None => snapshots.boxed(),
            Some(period) => snapshots.throttle(period).boxed(),
        }
    }

    /// Stream of accepted fix records (latest-wins for slow readers)
    pub fn fix_updates(&self) -> impl Stream<Item = FixRecord> + 'static {
        WatchStream::new(self.fixes.clone()).filter_map(|opt| async move { opt })
    }

    /// Latest accepted fix, if any
    pub fn current_fix(&self) -> Option<FixRecord> {
        *self.fixes.borrow()
    }

    /// Latest snapshot, if a tick has happened
    pub fn latest_snapshot(&self) -> Option<Arc<TelemetrySnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Counters as of the latest tick
    pub fn stats(&self) -> PipelineStats {
        *self.stats.borrow()
    }

    /// Claim the ordered stream of classified correction messages
    ///
    /// Returns `None` after the first call. Messages queue up until claimed.
    pub fn take_corrections(
        &mut self,
    ) -> Option<impl Stream<Item = ClassifiedMessage> + 'static> {
        self.corrections.take().map(UnboundedReceiverStream::new)
    }

    /// Wait until a snapshot is available
    pub async fn wait_for_snapshot(&self, timeout: Duration) -> Result<Arc<TelemetrySnapshot>> {
        let mut rx = self.snapshots.clone();
        let waited = tokio::time::timeout(timeout, async {
            rx.wait_for(|snapshot| snapshot.is_some()).await.map(|s| s.clone())
        })
        .await;

        match waited {
            Ok(Ok(Some(snapshot))) => Ok(snapshot),
            Ok(Ok(None)) | Ok(Err(_)) => Err(TelemetryError::channel_closed("snapshots")),
            Err(_) => Err(TelemetryError::Timeout { duration: timeout }),
        }
    }

    /// Snapshot frequency in Hz
    pub fn tick_hz(&self) -> f64 {
        self.tick_hz
    }

    /// Stop the pipeline task. Streams end once buffered values are read.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for TelemetryConnection {
    fn drop(&mut self) {
        debug!("Dropping telemetry connection");
        self.cancel.cancel();
    }
}
