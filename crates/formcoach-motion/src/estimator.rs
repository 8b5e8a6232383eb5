//! Tilt-angle and motion-intensity estimation.
//!
//! The wearable is strapped to the moving limb, so a full attitude filter
//! is unnecessary: a gravity-based tilt heuristic plus an exponentially
//! smoothed magnitude blend is enough for the gauge and the rep tracker.
//! The exercise thresholds are tuned against exactly this heuristic, so
//! its formula must not change without retuning them.

use glam::Vec3;

use crate::types::InvalidSampleError;

/// Fraction of the previous smoothed value retained each update.
const SMOOTHING_RETAIN: f32 = 0.7;
/// Fraction contributed by the newest value each update.
const SMOOTHING_BLEND: f32 = 0.3;
/// Angular-rate weight in the raw intensity blend.
const GYRO_WEIGHT: f32 = 0.7;
/// Acceleration weight in the raw intensity blend.
const ACCEL_WEIGHT: f32 = 0.3;
/// Gain mapping blended sensor magnitudes onto the gauge range.
const MOMENTUM_GAIN: f32 = 10.0;

/// How the reported angle tracks incoming samples.
///
/// The rep tracker wants the raw per-sample angle so threshold crossings
/// are not delayed; the momentum gauge wants the smoothed variant for a
/// steady needle. The caller picks per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleSmoothing {
    /// Report each newly computed angle directly.
    #[default]
    Raw,
    /// Blend 70% previous / 30% new before reporting.
    Smoothed,
}

/// Converts raw sensor vectors into the session's angle and momentum.
///
/// Holds only the previously reported values; O(1) per sample.
#[derive(Debug, Clone)]
pub struct OrientationEstimator {
    smoothing: AngleSmoothing,
    angle: f32,
    momentum: f32,
}

impl OrientationEstimator {
    pub fn new(smoothing: AngleSmoothing) -> Self {
        Self {
            smoothing,
            angle: 0.0,
            momentum: 0.0,
        }
    }

    /// Update the tilt angle from one accelerometer sample.
    ///
    /// `pitch = atan2(y, sqrt(x^2 + z^2))` and `roll = atan2(-x, z)`, both
    /// in degrees; the reported angle is whichever axis moved further from
    /// level, with pitch winning ties. Returns the angle that was stored.
    pub fn update_from_accel(&mut self, accel: Vec3) -> Result<f32, InvalidSampleError> {
        if !accel.is_finite() {
            return Err(InvalidSampleError::NonFiniteAccel);
        }

        let pitch = accel
            .y
            .atan2((accel.x * accel.x + accel.z * accel.z).sqrt())
            .to_degrees();
        let roll = (-accel.x).atan2(accel.z).to_degrees();
        let tilt = if pitch.abs() >= roll.abs() { pitch } else { roll };

        self.angle = match self.smoothing {
            AngleSmoothing::Raw => tilt,
            AngleSmoothing::Smoothed => self.angle * SMOOTHING_RETAIN + tilt * SMOOTHING_BLEND,
        };
        Ok(self.angle)
    }

    /// Update the motion-intensity estimate from a paired accel + gyro
    /// sample. The raw value is a weighted magnitude blend scaled onto the
    /// gauge range, then exponentially smoothed. Returns the stored value,
    /// which never goes negative.
    pub fn update_motion(&mut self, accel: Vec3, gyro: Vec3) -> Result<f32, InvalidSampleError> {
        if !accel.is_finite() {
            return Err(InvalidSampleError::NonFiniteAccel);
        }
        if !gyro.is_finite() {
            return Err(InvalidSampleError::NonFiniteGyro);
        }

        let raw = (gyro.length() * GYRO_WEIGHT + accel.length() * ACCEL_WEIGHT) * MOMENTUM_GAIN;
        self.momentum = self.momentum * SMOOTHING_RETAIN + raw * SMOOTHING_BLEND;
        Ok(self.momentum)
    }

    /// Latest reported tilt angle (degrees).
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Latest smoothed motion intensity.
    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    pub fn set_smoothing(&mut self, smoothing: AngleSmoothing) {
        self.smoothing = smoothing;
    }

    /// Clear the smoothed state for a new session.
    pub fn reset(&mut self) {
        self.angle = 0.0;
        self.momentum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_estimator() -> OrientationEstimator {
        OrientationEstimator::new(AngleSmoothing::Raw)
    }

    #[test]
    fn level_device_reads_zero() {
        let mut est = raw_estimator();
        let angle = est.update_from_accel(Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(angle.abs() < 1e-4);
    }

    #[test]
    fn straight_up_reads_positive_ninety() {
        let mut est = raw_estimator();
        let angle = est.update_from_accel(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!((angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn straight_down_reads_negative_ninety() {
        let mut est = raw_estimator();
        let angle = est.update_from_accel(Vec3::new(0.0, -1.0, 0.0)).unwrap();
        assert!((angle + 90.0).abs() < 1e-4);
    }

    #[test]
    fn forty_five_degree_pitch() {
        let mut est = raw_estimator();
        let c = 45.0f32.to_radians().cos();
        let angle = est.update_from_accel(Vec3::new(0.0, c, c)).unwrap();
        assert!((angle - 45.0).abs() < 1e-3);
    }

    #[test]
    fn dominant_roll_wins() {
        // Small pitch, near-quarter-turn roll: the roll axis is reported.
        let mut est = raw_estimator();
        let angle = est.update_from_accel(Vec3::new(-1.0, 0.2, 0.0)).unwrap();
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn pitch_wins_exact_tie() {
        // (1, sqrt(2), 1) puts pitch at +45 and roll at -45: equal
        // magnitude, so the pitch value is reported.
        let mut est = raw_estimator();
        let angle = est
            .update_from_accel(Vec3::new(1.0, 2.0f32.sqrt(), 1.0))
            .unwrap();
        assert!((angle - 45.0).abs() < 1e-3);
    }

    #[test]
    fn smoothed_mode_blends_seventy_thirty() {
        let mut est = OrientationEstimator::new(AngleSmoothing::Smoothed);
        let c = 45.0f32.to_radians().cos();
        // First update blends against the 0.0 initial state.
        let angle = est.update_from_accel(Vec3::new(0.0, c, c)).unwrap();
        assert!((angle - 13.5).abs() < 1e-2);
        let angle = est.update_from_accel(Vec3::new(0.0, c, c)).unwrap();
        assert!((angle - (13.5 * 0.7 + 45.0 * 0.3)).abs() < 1e-2);
    }

    #[test]
    fn raw_mode_tracks_instantly() {
        let mut est = raw_estimator();
        est.update_from_accel(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let angle = est.update_from_accel(Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(angle.abs() < 1e-4);
    }

    #[test]
    fn momentum_blend_matches_formula() {
        let mut est = raw_estimator();
        // |gyro| = 2, |accel| = 1: raw = (2 * 0.7 + 1 * 0.3) * 10 = 17.
        let m = est
            .update_motion(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0))
            .unwrap();
        assert!((m - 17.0 * 0.3).abs() < 1e-3);
    }

    #[test]
    fn momentum_decays_toward_zero_when_still() {
        let mut est = raw_estimator();
        est.update_motion(Vec3::splat(3.0), Vec3::splat(20.0)).unwrap();
        let high = est.momentum();
        for _ in 0..50 {
            est.update_motion(Vec3::ZERO, Vec3::ZERO).unwrap();
        }
        assert!(est.momentum() < high * 0.01);
        assert!(est.momentum() >= 0.0);
    }

    #[test]
    fn non_finite_accel_leaves_state_untouched() {
        let mut est = raw_estimator();
        est.update_from_accel(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let before = est.angle();
        let err = est.update_from_accel(Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(err, Err(InvalidSampleError::NonFiniteAccel));
        assert_eq!(est.angle(), before);
    }

    #[test]
    fn non_finite_gyro_leaves_momentum_untouched() {
        let mut est = raw_estimator();
        est.update_motion(Vec3::splat(1.0), Vec3::splat(1.0)).unwrap();
        let before = est.momentum();
        let err = est.update_motion(Vec3::ZERO, Vec3::new(0.0, f32::INFINITY, 0.0));
        assert_eq!(err, Err(InvalidSampleError::NonFiniteGyro));
        assert_eq!(est.momentum(), before);
    }

    #[test]
    fn reset_clears_both_estimates() {
        let mut est = OrientationEstimator::new(AngleSmoothing::Smoothed);
        est.update_from_accel(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        est.update_motion(Vec3::splat(1.0), Vec3::splat(5.0)).unwrap();
        est.reset();
        assert_eq!(est.angle(), 0.0);
        assert_eq!(est.momentum(), 0.0);
    }
}
