//! Inertial/magnetic sensor sample

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One tri-axis reading from the accelerometer, gyroscope and magnetometer.
///
/// Units: acceleration in g (only the direction is used), angular rate in
/// degrees per second, magnetic field in any consistent unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub accel: Vector3<f64>,
    pub gyro: Vector3<f64>,
    pub mag: Vector3<f64>,
}

impl ImuSample {
    pub fn new(accel: Vector3<f64>, gyro: Vector3<f64>, mag: Vector3<f64>) -> Self {
        Self { accel, gyro, mag }
    }

    /// Build a sample from nine scalars in `accel, gyro, mag` order.
    #[allow(clippy::too_many_arguments)]
    pub fn from_components(
        ax: f64,
        ay: f64,
        az: f64,
        gx: f64,
        gy: f64,
        gz: f64,
        mx: f64,
        my: f64,
        mz: f64,
    ) -> Self {
        Self {
            accel: Vector3::new(ax, ay, az),
            gyro: Vector3::new(gx, gy, gz),
            mag: Vector3::new(mx, my, mz),
        }
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.accel.iter().chain(self.gyro.iter()).chain(self.mag.iter()).all(|v| v.is_finite())
    }
}
