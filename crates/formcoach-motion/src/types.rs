use glam::Vec3;
use thiserror::Error;

/// One decoded notification from the sensor feed.
///
/// Either stream may be absent: the wearable interleaves acceleration-only
/// and combined frames depending on its reporting mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleFrame {
    /// Accelerometer reading (g).
    pub accel: Option<Vec3>,
    /// Gyroscope reading (deg/s).
    pub gyro: Option<Vec3>,
}

impl SampleFrame {
    /// Frame carrying only an accelerometer reading.
    pub fn accel_only(accel: Vec3) -> Self {
        Self {
            accel: Some(accel),
            gyro: None,
        }
    }

    /// Frame carrying both sensor streams.
    pub fn full(accel: Vec3, gyro: Vec3) -> Self {
        Self {
            accel: Some(accel),
            gyro: Some(gyro),
        }
    }

    /// Reject non-finite components before any state is touched.
    pub fn validate(&self) -> Result<(), InvalidSampleError> {
        if let Some(accel) = self.accel {
            if !accel.is_finite() {
                return Err(InvalidSampleError::NonFiniteAccel);
            }
        }
        if let Some(gyro) = self.gyro {
            if !gyro.is_finite() {
                return Err(InvalidSampleError::NonFiniteGyro);
            }
        }
        Ok(())
    }
}

/// Latest derived angle/momentum pair, published once per update tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionReading {
    /// Tilt proxy in degrees, signed.
    pub angle: f32,
    /// Motion-intensity proxy, always non-negative.
    pub momentum: f32,
}

/// How close a repetition's peak angle came to the configured target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepQuality {
    Great,
    Good,
    NeedsImprovement,
}

impl RepQuality {
    /// Label used on the wire and in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            RepQuality::Great => "great",
            RepQuality::Good => "good",
            RepQuality::NeedsImprovement => "needsImprovement",
        }
    }
}

/// Emitted exactly once per completed repetition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepResult {
    /// Peak angle reached during the repetition (degrees).
    pub max_angle_reached: f32,
    /// Quality of the peak against the configured target angle.
    pub quality: RepQuality,
}

/// A sample carried a NaN or infinite component.
///
/// Raised synchronously, before any estimator or tracker state mutation,
/// so the update that produced it is all-or-nothing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSampleError {
    #[error("accelerometer sample contains a non-finite component")]
    NonFiniteAccel,
    #[error("gyroscope sample contains a non-finite component")]
    NonFiniteGyro,
    #[error("angle input is non-finite")]
    NonFiniteAngle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_frame_validates() {
        let frame = SampleFrame::full(Vec3::new(0.1, 0.9, -0.2), Vec3::new(12.0, -3.0, 0.5));
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn empty_frame_validates() {
        let frame = SampleFrame {
            accel: None,
            gyro: None,
        };
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn nan_accel_rejected() {
        let frame = SampleFrame::accel_only(Vec3::new(0.0, f32::NAN, 0.0));
        assert_eq!(frame.validate(), Err(InvalidSampleError::NonFiniteAccel));
    }

    #[test]
    fn infinite_gyro_rejected() {
        let frame = SampleFrame::full(Vec3::ZERO, Vec3::new(f32::INFINITY, 0.0, 0.0));
        assert_eq!(frame.validate(), Err(InvalidSampleError::NonFiniteGyro));
    }

    #[test]
    fn quality_labels() {
        assert_eq!(RepQuality::Great.label(), "great");
        assert_eq!(RepQuality::Good.label(), "good");
        assert_eq!(RepQuality::NeedsImprovement.label(), "needsImprovement");
    }
}
