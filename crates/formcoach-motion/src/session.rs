//! One exercise session: estimator and tracker behind a single update call.

use crate::estimator::{AngleSmoothing, OrientationEstimator};
use crate::tracker::{InvalidConfigError, RepPhase, RepTracker, TrackerConfig};
use crate::types::{InvalidSampleError, MotionReading, RepResult, SampleFrame};

/// Everything a session needs at construction time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    /// Repetition detection thresholds.
    pub tracker: TrackerConfig,
    /// Angle smoothing strategy for this surface.
    pub angle_smoothing: AngleSmoothing,
}

/// Outcome of one synchronous update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionTick {
    /// Angle and momentum after this frame.
    pub reading: MotionReading,
    /// Present when this frame completed a repetition.
    pub rep: Option<RepResult>,
}

/// Per-session state: one estimator, one tracker, no shared globals.
///
/// Frames must be delivered one at a time; results come out in completion
/// order. Concurrent workouts run on independent instances.
#[derive(Debug, Clone)]
pub struct ExerciseSession {
    estimator: OrientationEstimator,
    tracker: RepTracker,
}

impl ExerciseSession {
    pub fn new(config: SessionConfig) -> Result<Self, InvalidConfigError> {
        Ok(Self {
            estimator: OrientationEstimator::new(config.angle_smoothing),
            tracker: RepTracker::new(config.tracker)?,
        })
    }

    /// Swap in new thresholds and smoothing strategy, effective from the
    /// next frame. Running state is kept; call [`ExerciseSession::reset`]
    /// at a workout boundary.
    pub fn configure(&mut self, config: SessionConfig) -> Result<(), InvalidConfigError> {
        self.tracker.configure(config.tracker)?;
        self.estimator.set_smoothing(config.angle_smoothing);
        Ok(())
    }

    /// Run one decoded frame through the estimator and the tracker.
    ///
    /// The frame is validated up front, so an error leaves the session
    /// exactly as it was. Momentum updates only when both streams are
    /// present; the angle (and with it the tracker) advances whenever the
    /// frame carries an accelerometer reading. A frame with neither stream
    /// is a no-op tick.
    pub fn update(&mut self, frame: &SampleFrame) -> Result<SessionTick, InvalidSampleError> {
        frame.validate()?;

        if let (Some(accel), Some(gyro)) = (frame.accel, frame.gyro) {
            self.estimator.update_motion(accel, gyro)?;
        }

        let rep = match frame.accel {
            Some(accel) => {
                let angle = self.estimator.update_from_accel(accel)?;
                self.tracker.advance(angle)?
            }
            None => None,
        };

        Ok(SessionTick {
            reading: self.reading(),
            rep,
        })
    }

    /// Latest angle and momentum estimate.
    pub fn reading(&self) -> MotionReading {
        MotionReading {
            angle: self.estimator.angle(),
            momentum: self.estimator.momentum(),
        }
    }

    /// Current repetition phase.
    pub fn phase(&self) -> RepPhase {
        self.tracker.phase()
    }

    /// Re-initialize for a new workout. A repetition in flight is
    /// abandoned silently.
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.tracker.reset();
    }
}
