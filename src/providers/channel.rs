//! Channel provider fed by an external transport

use tokio::sync::mpsc;
use tracing::debug;

use crate::provider::Provider;
use crate::types::{ImuSample, SourceEvent};
use crate::{Result, TelemetryError};

/// Default number of events buffered between a [`SourceHandle`] and the driver.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Provider that yields whatever external collaborators push through a
/// [`SourceHandle`].
///
/// The stream ends once every handle has been dropped and the buffer is
/// drained.
pub struct ChannelProvider {
    events: mpsc::Receiver<SourceEvent>,
    sample_rate_hz: f64,
}

impl ChannelProvider {
    /// Create a provider and the handle used to feed it.
    pub fn new(sample_rate_hz: f64) -> (Self, SourceHandle) {
        Self::with_capacity(sample_rate_hz, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(sample_rate_hz: f64, capacity: usize) -> (Self, SourceHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { events: rx, sample_rate_hz }, SourceHandle { events: tx })
    }
}

#[async_trait::async_trait]
impl Provider for ChannelProvider {
    async fn next_event(&mut self) -> Result<Option<SourceEvent>> {
        let event = self.events.recv().await;
        if event.is_none() {
            debug!("All source handles dropped");
        }
        Ok(event)
    }

    fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
}

/// Cloneable sender side of a [`ChannelProvider`].
///
/// Transports push raw receiver chunks, correction chunks, pre-split
/// sentences and IMU samples in the order they arrive.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    events: mpsc::Sender<SourceEvent>,
}

impl SourceHandle {
    /// Deliver an event, waiting while the buffer is full.
    pub async fn send(&self, event: SourceEvent) -> Result<()> {
        self.events.send(event).await.map_err(|_| TelemetryError::channel_closed("source events"))
    }

    /// Deliver an event without waiting.
    pub fn try_send(&self, event: SourceEvent) -> Result<()> {
        self.events.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                TelemetryError::source_failed("source event buffer is full")
            }
            mpsc::error::TrySendError::Closed(_) => {
                TelemetryError::channel_closed("source events")
            }
        })
    }

    pub async fn receiver_bytes(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.send(SourceEvent::Receiver(bytes.into())).await
    }

    pub async fn correction_bytes(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.send(SourceEvent::Corrections(bytes.into())).await
    }

    pub async fn sentence(&self, line: impl Into<String>) -> Result<()> {
        self.send(SourceEvent::Sentence(line.into())).await
    }

    pub async fn imu(&self, sample: ImuSample) -> Result<()> {
        self.send(SourceEvent::Imu(sample)).await
    }

    /// Whether the provider side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::level_sample;

    #[tokio::test]
    async fn events_arrive_in_send_order() {
        let (mut provider, handle) = ChannelProvider::new(100.0);
        handle.receiver_bytes(vec![1, 2, 3]).await.unwrap();
        handle.sentence("$GNGGA").await.unwrap();
        handle.imu(level_sample()).await.unwrap();
        drop(handle);

        assert_eq!(provider.next_event().await.unwrap(), Some(SourceEvent::Receiver(vec![1, 2, 3])));
        assert_eq!(provider.next_event().await.unwrap(), Some(SourceEvent::Sentence("$GNGGA".into())));
        assert_eq!(provider.next_event().await.unwrap(), Some(SourceEvent::Imu(level_sample())));
        assert_eq!(provider.next_event().await.unwrap(), None);
        assert_eq!(provider.sample_rate_hz(), 100.0);
    }

    #[tokio::test]
    async fn full_buffer_and_closed_provider_are_errors() {
        let (provider, handle) = ChannelProvider::with_capacity(100.0, 1);
        handle.try_send(SourceEvent::Sentence("a".into())).unwrap();

        let err = handle.try_send(SourceEvent::Sentence("b".into())).unwrap_err();
        assert!(matches!(err, TelemetryError::Source { .. }));

        drop(provider);
        assert!(handle.is_closed());
        let err = handle.sentence("c").await.unwrap_err();
        assert!(matches!(err, TelemetryError::ChannelClosed { .. }));
    }
}
