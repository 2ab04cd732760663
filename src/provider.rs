//! Provider trait for event sources

use crate::Result;
use crate::types::SourceEvent;

/// Trait for pipeline input sources
///
/// Providers abstract over where events come from (a live transport pushing
/// through a channel, a recorded log) and handle their own pacing.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Get the next input event
    ///
    /// Returns:
    /// - `Ok(Some(event))` - New event available
    /// - `Ok(None)` - Source ended (normal termination)
    /// - `Err(e)` - Error occurred; the driver backs off and retries
    ///
    /// The driver polls this inside `tokio::select!` alongside its
    /// aggregation timer, so implementations must be cancel-safe: dropping
    /// the future before it completes must not lose an event.
    async fn next_event(&mut self) -> Result<Option<SourceEvent>>;

    /// Nominal IMU sample rate of the source in Hz
    fn sample_rate_hz(&self) -> f64;
}
