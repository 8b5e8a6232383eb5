use formcoach_motion::estimator::{AngleSmoothing, OrientationEstimator};
use formcoach_motion::session::{ExerciseSession, SessionConfig};
use formcoach_motion::types::SampleFrame;
use glam::Vec3;
use proptest::prelude::*;

fn finite_component() -> impl Strategy<Value = f32> {
    -100.0f32..100.0
}

fn finite_vec3() -> impl Strategy<Value = Vec3> {
    (finite_component(), finite_component(), finite_component())
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn sample_run() -> impl Strategy<Value = Vec<(Vec3, Vec3)>> {
    prop::collection::vec((finite_vec3(), finite_vec3()), 1..64)
}

#[test]
fn momentum_never_negative() {
    proptest!(|(samples in sample_run())| {
        let mut estimator = OrientationEstimator::new(AngleSmoothing::Raw);
        for (accel, gyro) in samples {
            let momentum = estimator.update_motion(accel, gyro).unwrap();
            prop_assert!(momentum >= 0.0);
        }
    });
}

#[test]
fn angle_stays_within_half_circle() {
    proptest!(|(samples in prop::collection::vec(finite_vec3(), 1..64))| {
        let mut estimator = OrientationEstimator::new(AngleSmoothing::Raw);
        for accel in samples {
            let angle = estimator.update_from_accel(accel).unwrap();
            prop_assert!((-180.0..=180.0).contains(&angle));
        }
    });
}

#[test]
fn replay_after_reset_is_deterministic() {
    proptest!(|(samples in sample_run())| {
        let mut session = ExerciseSession::new(SessionConfig::default()).unwrap();

        let first: Vec<_> = samples
            .iter()
            .map(|&(accel, gyro)| session.update(&SampleFrame::full(accel, gyro)).unwrap())
            .collect();
        session.reset();
        let second: Vec<_> = samples
            .iter()
            .map(|&(accel, gyro)| session.update(&SampleFrame::full(accel, gyro)).unwrap())
            .collect();

        prop_assert_eq!(first, second);
    });
}

#[test]
fn independent_sessions_do_not_interact() {
    proptest!(|(samples in sample_run())| {
        let mut solo = ExerciseSession::new(SessionConfig::default()).unwrap();
        let mut paired = ExerciseSession::new(SessionConfig::default()).unwrap();
        let mut other = ExerciseSession::new(SessionConfig::default()).unwrap();

        for &(accel, gyro) in &samples {
            let expected = solo.update(&SampleFrame::full(accel, gyro)).unwrap();
            let got = paired.update(&SampleFrame::full(accel, gyro)).unwrap();
            // Interleave unrelated traffic into the second session.
            other.update(&SampleFrame::accel_only(gyro)).unwrap();
            prop_assert_eq!(expected, got);
        }
    });
}
