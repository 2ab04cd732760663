//! Test utilities for building wire data and sensor samples
//!
//! Shared by unit tests and the benchmarks so that every test builds frames,
//! sentences and IMU sequences the same way.

#![cfg(any(test, feature = "benchmark"))]

use nalgebra::Vector3;

use crate::nmea::sentence_checksum;
use crate::types::{CorrectionFrame, ImuSample};

/// Wrap a payload in a complete correction frame (marker, length, CRC).
///
/// # Panics
///
/// Panics if the payload is longer than a frame can carry.
pub fn frame_bytes(payload: &[u8]) -> Vec<u8> {
    CorrectionFrame::encode(payload).expect("payload fits in a frame")
}

/// A payload of `len` bytes whose first 12 bits carry message number `id`.
///
/// The remaining bytes follow a fixed pattern so tests are reproducible.
pub fn msm_payload(id: u16, len: usize) -> Vec<u8> {
    assert!(id < 4096, "message numbers are 12 bits");
    assert!(len >= 2, "message number needs two bytes");

    let mut payload = vec![(id >> 4) as u8, ((id & 0x0F) << 4) as u8];
    payload.extend((2..len).map(|i| (i as u8).wrapping_mul(37).wrapping_add(11)));
    payload
}

/// Append a correct `*hh` checksum to a sentence body given without `$`.
pub fn with_checksum(body: &str) -> String {
    format!("${}*{:02X}", body, sentence_checksum(body))
}

/// Level, stationary sample: gravity on +z, field along +x, no rotation.
pub fn level_sample() -> ImuSample {
    ImuSample::new(Vector3::new(0.0, 0.0, 1.0), Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0))
}

/// A slowly yawing, slightly tilted sample sequence for benchmarks.
pub fn imu_sequence(count: usize) -> Vec<ImuSample> {
    (0..count)
        .map(|i| {
            let t = i as f64 * 0.01;
            ImuSample::new(
                Vector3::new(0.05 * t.sin(), 0.05 * t.cos(), 0.99),
                Vector3::new(0.5, -0.25, 15.0),
                Vector3::new(0.3 * t.cos(), 0.3 * t.sin(), -0.5),
            )
        })
        .collect()
}

/// A correction byte stream of `frames` MSM7 frames separated by noise.
pub fn correction_stream(frames: usize) -> Vec<u8> {
    const IDS: [u16; 5] = [1077, 1087, 1097, 1127, 1230];
    let mut stream = Vec::new();
    for i in 0..frames {
        stream.extend_from_slice(&[0x00, 0x7F, 0xFF]);
        stream.extend(frame_bytes(&msm_payload(IDS[i % IDS.len()], 64 + i % 128)));
    }
    stream
}

/// A small replay log: one receiver chunk carrying a 1005 frame, one fix
/// sentence and two IMU samples (the second degenerate).
pub fn replay_log_yaml() -> &'static str {
    r#"
- receiver: [211, 0, 6, 62, 208, 0, 1, 2, 3, 177, 223, 202]
- sentence: "$GNGGA,123519,4807.038,N,01131.000,E,4,08,0.9,545.4,M,46.9,M,,*47"
- imu:
    accel: [0.0, 0.0, 1.0]
    gyro: [0.0, 0.0, 10.0]
    mag: [0.3, 0.0, -0.5]
- imu:
    accel: [0.0, 0.0, 0.0]
    gyro: [0.0, 0.0, 10.0]
    mag: [0.3, 0.0, -0.5]
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtcm::{FrameSynchronizer, message_number};

    #[test]
    fn msm_payload_carries_message_number() {
        assert_eq!(message_number(&msm_payload(1077, 8)), Some(1077));
        assert_eq!(msm_payload(1005, 19).len(), 19);
    }

    #[test]
    fn replay_log_frame_is_valid() {
        let mut sync = FrameSynchronizer::new();
        let frames: Vec<_> =
            sync.feed(&[211, 0, 6, 62, 208, 0, 1, 2, 3, 177, 223, 202]).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(message_number(frames[0].payload()), Some(1005));
    }

    #[test]
    fn correction_stream_decodes_fully() {
        let mut sync = FrameSynchronizer::new();
        assert_eq!(sync.feed(&correction_stream(12)).count(), 12);
    }
}
