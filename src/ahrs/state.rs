//! Attitude quaternion and the gradient-descent MARG transition

use nalgebra::{Matrix6x4, Quaternion, Vector3, Vector4, Vector6};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::config::FilterConfig;
use crate::types::ImuSample;

/// Why a sample was not fused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Degenerate {
    #[error("acceleration vector has zero magnitude")]
    ZeroAcceleration,
    #[error("magnetic field vector has zero magnitude")]
    ZeroMagneticField,
    #[error("sample contains a non-finite component")]
    NonFiniteInput,
    #[error("update produced a non-finite quaternion")]
    NonFiniteResult,
}

/// Current attitude as a unit quaternion, scalar first.
///
/// The quaternion rotates earth-frame vectors into the sensor frame. It is
/// serialized as `{w, x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuaternionRepr", into = "QuaternionRepr")]
pub struct OrientationState {
    quaternion: Quaternion<f64>,
}

#[derive(Serialize, Deserialize)]
struct QuaternionRepr {
    w: f64,
    x: f64,
    y: f64,
    z: f64,
}

impl From<QuaternionRepr> for OrientationState {
    fn from(r: QuaternionRepr) -> Self {
        Self { quaternion: Quaternion::new(r.w, r.x, r.y, r.z) }
    }
}

impl From<OrientationState> for QuaternionRepr {
    fn from(s: OrientationState) -> Self {
        let q = s.quaternion;
        Self { w: q.w, x: q.i, y: q.j, z: q.k }
    }
}

impl Default for OrientationState {
    fn default() -> Self {
        Self::identity()
    }
}

impl OrientationState {
    /// The identity orientation `(1, 0, 0, 0)`.
    pub fn identity() -> Self {
        Self { quaternion: Quaternion::identity() }
    }

    /// Wrap an existing quaternion, normalizing it.
    ///
    /// Returns `None` for a zero or non-finite quaternion.
    pub fn from_quaternion(quaternion: Quaternion<f64>) -> Option<Self> {
        let norm = quaternion.norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        Some(Self { quaternion: quaternion / norm })
    }

    pub fn quaternion(&self) -> Quaternion<f64> {
        self.quaternion
    }

    pub fn norm(&self) -> f64 {
        self.quaternion.norm()
    }

    /// Roll, pitch and yaw in degrees (ZYX sequence).
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        let q = &self.quaternion;
        let (w, x, y, z) = (q.w, q.i, q.j, q.k);

        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        // Clamp so gimbal lock reports +-90 instead of NaN.
        let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        (roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
    }

    /// Fuse one sample into a new state.
    ///
    /// Gyroscope kinematics are integrated over the configured sample period
    /// and corrected by `gain` times the normalized objective gradient of the
    /// gravity and magnetic-field alignment. A zero gradient skips the
    /// correction but still integrates. `self` is never modified.
    pub fn fuse(&self, sample: &ImuSample, config: &FilterConfig) -> Result<Self, Degenerate> {
        if !sample.is_finite() {
            return Err(Degenerate::NonFiniteInput);
        }

        let accel_norm = sample.accel.norm();
        if accel_norm == 0.0 {
            return Err(Degenerate::ZeroAcceleration);
        }
        let mag_norm = sample.mag.norm();
        if mag_norm == 0.0 {
            return Err(Degenerate::ZeroMagneticField);
        }

        let q = self.quaternion;
        let a = sample.accel / accel_norm;
        let m = sample.mag / mag_norm;
        let gyro = sample.gyro.map(f64::to_radians);

        // Rate of change implied by the measured angular velocity.
        let mut q_dot = q * Quaternion::from_imag(gyro) * 0.5;

        let gradient = objective_gradient(&q, &a, &m);
        let gradient_norm = gradient.norm();
        if gradient_norm > 0.0 && gradient_norm.is_finite() {
            let step = gradient / gradient_norm;
            q_dot -= Quaternion::new(step[0], step[1], step[2], step[3]) * config.gain;
        }

        let integrated = q + q_dot * config.sample_period();
        let norm = integrated.norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(Degenerate::NonFiniteResult);
        }

        let next = integrated / norm;
        trace!(w = next.w, x = next.i, y = next.j, z = next.k, "Fused IMU sample");
        Ok(Self { quaternion: next })
    }
}

/// `J^T f` for the stacked gravity and magnetic objective functions.
///
/// Components are ordered `(w, x, y, z)`.
fn objective_gradient(q: &Quaternion<f64>, a: &Vector3<f64>, m: &Vector3<f64>) -> Vector4<f64> {
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);

    // Earth-frame field direction, reduced to its horizontal and vertical parts.
    let h = (q * Quaternion::from_imag(*m) * q.conjugate()).imag();
    let bx = (h.x * h.x + h.y * h.y).sqrt();
    let bz = h.z;

    let f = Vector6::new(
        2.0 * (x * z - w * y) - a.x,
        2.0 * (w * x + y * z) - a.y,
        2.0 * (0.5 - x * x - y * y) - a.z,
        2.0 * bx * (0.5 - y * y - z * z) + 2.0 * bz * (x * z - w * y) - m.x,
        2.0 * bx * (x * y - w * z) + 2.0 * bz * (w * x + y * z) - m.y,
        2.0 * bx * (w * y + x * z) + 2.0 * bz * (0.5 - x * x - y * y) - m.z,
    );

    #[rustfmt::skip]
    let jacobian = Matrix6x4::new(
        -2.0 * y, 2.0 * z, -2.0 * w, 2.0 * x,
        2.0 * x, 2.0 * w, 2.0 * z, 2.0 * y,
        0.0, -4.0 * x, -4.0 * y, 0.0,
        -2.0 * bz * y, 2.0 * bz * z, -4.0 * bx * y - 2.0 * bz * w, -4.0 * bx * z + 2.0 * bz * x,
        -2.0 * bx * z + 2.0 * bz * x, 2.0 * bx * y + 2.0 * bz * w, 2.0 * bx * x + 2.0 * bz * z, -2.0 * bx * w + 2.0 * bz * y,
        2.0 * bx * y, 2.0 * bx * z - 4.0 * bz * x, 2.0 * bx * w - 4.0 * bz * y, 2.0 * bx * x,
    );

    jacobian.transpose() * f
}
