//! Core value types flowing through the pipeline.
//!
//! - [`CorrectionFrame`] is a trailer-verified RTCM frame with a shared payload
//! - [`FixRecord`] is the latest decoded position fix
//! - [`ImuSample`] is one accelerometer/gyroscope/magnetometer reading
//! - [`TelemetrySnapshot`] composes fix, orientation and the last sample
//! - [`SourceEvent`] is the unit of input delivered by providers
//! - [`EventLog`] is the YAML layout of a recorded event sequence
//! - [`UpdateRate`] controls how often subscribers receive snapshots
//!
//! ## Usage Example
//!
//! ```rust
//! use navfusion::types::{CorrectionFrame, FRAME_MARKER};
//!
//! let wire = CorrectionFrame::encode(&[0x3E, 0xD0, 0x00]).unwrap();
//! assert_eq!(wire[0], FRAME_MARKER);
//! assert_eq!(wire.len(), 3 + 3 + 3);
//! ```

mod event;
mod fix;
mod frame;
mod imu;
mod snapshot;
mod update_rate;

pub use event::{EventLog, SourceEvent};
pub use fix::{FixQuality, FixRecord, FixTime};
pub use frame::{
    CorrectionFrame, FRAME_HEADER_LEN, FRAME_MARKER, FRAME_TRAILER_LEN, MAX_PAYLOAD_LEN,
    PAYLOAD_LEN_MASK,
};
pub use imu::ImuSample;
pub use snapshot::TelemetrySnapshot;
pub use update_rate::UpdateRate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_event_yaml_layout() {
        let yaml = r#"
- sentence: "$GNGGA,123519,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47"
- corrections: [211, 0, 0, 71, 234, 75]
- imu:
    accel: [0.0, 0.0, 1.0]
    gyro: [0.0, 0.0, 0.0]
    mag: [0.3, 0.0, -0.5]
"#;
        let events = EventLog::from_yaml_str(yaml).unwrap().events;
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], SourceEvent::Sentence(line) if line.starts_with("$GNGGA")));
        assert!(matches!(&events[1], SourceEvent::Corrections(bytes) if bytes.len() == 6));
        match &events[2] {
            SourceEvent::Imu(sample) => {
                assert_eq!(sample.accel.z, 1.0);
                assert_eq!(sample.mag.z, -0.5);
            }
            other => panic!("Expected imu event, got {:?}", other),
        }
        assert_eq!(events[2].kind(), "imu");
    }

    #[test]
    fn snapshot_serializes_for_presentation() {
        let snapshot = TelemetrySnapshot {
            tick: 3,
            fix: FixRecord { quality: FixQuality::RtkFix, ..FixRecord::default() },
            orientation: crate::ahrs::OrientationState::identity(),
            imu: None,
        };
        let yaml = serde_yaml_ng::to_string(&snapshot).unwrap();
        assert!(yaml.contains("tick: 3"));
        assert!(yaml.contains("RtkFix"));
    }
}
