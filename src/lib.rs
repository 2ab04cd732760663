//! Streaming GNSS and inertial telemetry fusion.
//!
//! Navfusion turns the raw output of a positioning receiver and an inertial
//! sensor into a steady stream of telemetry snapshots.
//!
//! # Features
//!
//! - **Correction framing**: CRC-verified RTCM 3 frames from arbitrarily chunked bytes
//! - **Position decoding**: GGA fix sentences with configurable fix-quality policy
//! - **Orientation**: gradient-descent MARG fusion into a unit quaternion
//! - **Streaming**: periodic snapshots, fix updates and ordered correction messages
//!
//! The decoding core ([`rtcm`], [`nmea`], [`ahrs`], [`pipeline`]) is synchronous
//! and never fails; malformed input degrades to resynchronisation, rejected
//! sentences or skipped updates. The async layer ([`driver`],
//! [`connection`]) runs the core on a single tokio task.
//!
//! ## Example (channel-fed pipeline)
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use navfusion::{Navfusion, PipelineConfig, UpdateRate};
//!
//! #[tokio::main]
//! async fn main() -> navfusion::Result<()> {
//!     let (connection, handle) = Navfusion::attach(&PipelineConfig::default())?;
//!
//!     // A serial reader task would push raw receiver chunks here
//!     let chunk = b"$GNGGA,123519,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47\r\n";
//!     handle.receiver_bytes(chunk.to_vec()).await?;
//!
//!     let mut snapshots = connection.snapshots(UpdateRate::Native);
//!     while let Some(snapshot) = snapshots.next().await {
//!         println!("{:?} {:?}", snapshot.fix.quality, snapshot.orientation.euler_angles());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding core
pub mod aggregator;
pub mod ahrs;
pub mod nmea;
pub mod pipeline;
pub mod rtcm;

// Stream-based delivery
pub mod connection;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use ahrs::{OrientationFilter, OrientationState, UpdateOutcome};
pub use config::PipelineConfig;
pub use connection::TelemetryConnection;
pub use nmea::PositionSentenceDecoder;
pub use pipeline::{Pipeline, PipelineEvent, PipelineStats};
pub use providers::SourceHandle;
pub use rtcm::{ClassifiedMessage, FrameClassifier, FrameSynchronizer, MessageType};

use providers::ChannelProvider;

/// Unified entry point for Navfusion pipelines.
///
/// # Examples
///
/// ## Live transport
/// ```rust,no_run
/// use navfusion::{Navfusion, PipelineConfig};
///
/// #[tokio::main]
/// async fn main() -> navfusion::Result<()> {
///     let config = PipelineConfig::from_file("navfusion.yaml")?;
///     let (connection, handle) = Navfusion::attach(&config)?;
///     // Hand `handle` to the serial and IMU reader tasks...
///     Ok(())
/// }
/// ```
///
/// ## Replay log
/// ```rust,no_run
/// use navfusion::{Navfusion, PipelineConfig};
///
/// #[tokio::main]
/// async fn main() -> navfusion::Result<()> {
///     let connection = Navfusion::open_replay("drive.yaml", &PipelineConfig::default()).await?;
///     // Use connection...
///     Ok(())
/// }
/// ```
pub struct Navfusion;

impl Navfusion {
    /// Start a pipeline fed through the returned [`SourceHandle`].
    ///
    /// The handle can be cloned and shared between transport tasks. The
    /// pipeline stops when the connection is dropped or every handle is gone.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn attach(config: &PipelineConfig) -> Result<(TelemetryConnection, SourceHandle)> {
        let (provider, handle) = ChannelProvider::new(config.filter.sample_rate_hz);
        let connection = TelemetryConnection::with_provider(provider, config)?;
        Ok((connection, handle))
    }

    /// Replay a recorded YAML event log.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist or is not readable
    /// - The log is not a valid event sequence
    /// - `config` fails validation
    pub async fn open_replay<P: AsRef<std::path::Path>>(
        path: P,
        config: &PipelineConfig,
    ) -> Result<TelemetryConnection> {
        TelemetryConnection::open_replay(path, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn attach_round_trip() {
        let _ = tracing_subscriber::fmt::try_init();

        let mut config = PipelineConfig::default();
        config.aggregator.tick_interval_ms = 100;
        let (connection, handle) = Navfusion::attach(&config).unwrap();

        let line = "$GNGGA,123519,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47\r\n";
        handle.receiver_bytes(line.as_bytes().to_vec()).await.unwrap();

        let mut snapshots = Box::pin(connection.snapshots(UpdateRate::Native));
        let snapshot = tokio::time::timeout(Duration::from_secs(1), snapshots.next())
            .await
            .expect("Timeout waiting for snapshot")
            .expect("Snapshot stream should not end");

        assert_eq!(snapshot.fix.quality, FixQuality::RtkFix);
        assert_eq!(snapshot.orientation, OrientationState::identity());
    }

    #[test]
    fn attach_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.aggregator.tick_interval_ms = 0;
        assert!(matches!(Navfusion::attach(&config), Err(TelemetryError::Config { .. })));
    }
}
