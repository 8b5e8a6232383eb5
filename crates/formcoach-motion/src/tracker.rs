//! Repetition detection state machine.
//!
//! Consumes the tilt-angle stream one value at a time and emits a
//! [`RepResult`] exactly once per completed raise-and-lower cycle. The gap
//! between `rep_threshold` and `rest_threshold` gives the machine
//! hysteresis, so sensor noise around a single threshold cannot
//! double-count a repetition.

use thiserror::Error;

use crate::types::{InvalidSampleError, RepQuality, RepResult};

/// Degrees below the target angle still scored "great".
const GREAT_MARGIN: f32 = 5.0;
/// Degrees below the target angle still scored "good".
const GOOD_MARGIN: f32 = 15.0;

/// Invalid threshold combination, rejected before it can take effect.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum InvalidConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("threshold ordering violated: need rest ({rest}) < rep ({rep}) < target ({target})")]
    Ordering { rest: f32, rep: f32, target: f32 },
}

/// Per-exercise thresholds, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    /// Angle above which a raise counts as started.
    pub rep_threshold: f32,
    /// Angle below which the limb is considered back at rest.
    pub rest_threshold: f32,
    /// Goal angle for quality scoring.
    pub target_angle: f32,
    /// Drop from the running peak that signals lowering has begun.
    pub lowering_drop_delta: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        // Tuned for a lateral raise to roughly horizontal.
        Self {
            rep_threshold: 80.0,
            rest_threshold: 30.0,
            target_angle: 100.0,
            lowering_drop_delta: 15.0,
        }
    }
}

impl TrackerConfig {
    /// Check positivity and the `rest < rep < target` ordering.
    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        for (name, value) in [
            ("rep_threshold", self.rep_threshold),
            ("rest_threshold", self.rest_threshold),
            ("target_angle", self.target_angle),
            ("lowering_drop_delta", self.lowering_drop_delta),
        ] {
            if !(value > 0.0) {
                return Err(InvalidConfigError::NonPositive { name, value });
            }
        }
        if !(self.rest_threshold < self.rep_threshold && self.rep_threshold < self.target_angle) {
            return Err(InvalidConfigError::Ordering {
                rest: self.rest_threshold,
                rep: self.rep_threshold,
                target: self.target_angle,
            });
        }
        Ok(())
    }
}

/// Phase of the repetition currently believed in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepPhase {
    /// Limb below the rest threshold, no rep under way.
    #[default]
    Rest,
    /// A raise has crossed the rep threshold; the peak is still climbing.
    Raising,
    /// The angle has fallen noticeably off the peak.
    Lowering,
}

/// Detects completed repetitions in the angle stream.
#[derive(Debug, Clone)]
pub struct RepTracker {
    config: TrackerConfig,
    phase: RepPhase,
    max_angle_reached: f32,
    in_progress: bool,
}

impl RepTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, InvalidConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: RepPhase::Rest,
            max_angle_reached: 0.0,
            in_progress: false,
        })
    }

    /// Replace the thresholds. Running phase state is kept; use
    /// [`RepTracker::reset`] at a session boundary.
    pub fn configure(&mut self, config: TrackerConfig) -> Result<(), InvalidConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Advance the state machine by one angle sample.
    ///
    /// Returns a result when this sample completed a repetition. Every
    /// condition is evaluated against the peak as it stood before this
    /// sample, so a tick never reacts to its own mutation.
    pub fn advance(&mut self, angle: f32) -> Result<Option<RepResult>, InvalidSampleError> {
        if !angle.is_finite() {
            return Err(InvalidSampleError::NonFiniteAngle);
        }

        let completed = match self.phase {
            RepPhase::Rest => {
                if angle > self.config.rep_threshold {
                    self.in_progress = true;
                    self.max_angle_reached = angle;
                    self.phase = RepPhase::Raising;
                }
                None
            }
            RepPhase::Raising => {
                if angle < self.config.rest_threshold && self.in_progress {
                    Some(self.complete())
                } else if angle < self.max_angle_reached - self.config.lowering_drop_delta {
                    self.phase = RepPhase::Lowering;
                    None
                } else if angle > self.max_angle_reached {
                    self.max_angle_reached = angle;
                    None
                } else {
                    None
                }
            }
            RepPhase::Lowering => {
                if angle < self.config.rest_threshold && self.in_progress {
                    Some(self.complete())
                } else {
                    None
                }
            }
        };

        Ok(completed)
    }

    fn complete(&mut self) -> RepResult {
        let result = RepResult {
            max_angle_reached: self.max_angle_reached,
            quality: self.score(self.max_angle_reached),
        };
        self.in_progress = false;
        self.max_angle_reached = 0.0;
        self.phase = RepPhase::Rest;
        result
    }

    /// Quality of a finished rep, from its peak angle.
    fn score(&self, peak: f32) -> RepQuality {
        if peak >= self.config.target_angle - GREAT_MARGIN {
            RepQuality::Great
        } else if peak >= self.config.target_angle - GOOD_MARGIN {
            RepQuality::Good
        } else {
            RepQuality::NeedsImprovement
        }
    }

    pub fn phase(&self) -> RepPhase {
        self.phase
    }

    /// Highest angle seen during the repetition in progress.
    pub fn max_angle_reached(&self) -> f32 {
        self.max_angle_reached
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Abandon any in-flight repetition and return to rest. Abandonment is
    /// not an error and emits nothing.
    pub fn reset(&mut self) {
        self.phase = RepPhase::Rest;
        self.max_angle_reached = 0.0;
        self.in_progress = false;
    }
}
