//! Attitude estimation from accelerometer, gyroscope and magnetometer samples.
//!
//! [`OrientationState::fuse`] is a pure `(state, sample) -> state'` transition
//! implementing gradient-descent MARG fusion. [`OrientationFilter`] owns one
//! state and reports whether each update was applied.
//!
//! Degenerate samples (zero-length gravity or magnetic field, non-finite
//! components) are rejected and never alter the stored quaternion.
//!
//! ## Usage Example
//!
//! ```rust
//! use navfusion::ahrs::{OrientationFilter, UpdateOutcome};
//! use navfusion::config::FilterConfig;
//! use navfusion::types::ImuSample;
//!
//! let mut filter = OrientationFilter::new(FilterConfig::default())?;
//! let sample = ImuSample::from_components(0.0, 0.0, 1.0, 0.0, 0.0, 5.0, 0.4, 0.0, -0.3);
//! assert_eq!(filter.update(&sample), UpdateOutcome::Applied);
//!
//! let (roll, pitch, yaw) = filter.state().euler_angles();
//! println!("roll {roll:.1} pitch {pitch:.1} yaw {yaw:.1}");
//! # Ok::<(), navfusion::TelemetryError>(())
//! ```

mod filter;
mod state;

pub use filter::{OrientationFilter, UpdateOutcome};
pub use state::{Degenerate, OrientationState};
