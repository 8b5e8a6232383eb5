use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where to reach the wearable's sample feed.
    pub device: DeviceConfig,
    /// Repetition thresholds for the selected exercise.
    pub exercise: ExerciseConfig,
    /// Live gauge presentation.
    pub gauge: GaugeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            exercise: ExerciseConfig::default(),
            gauge: GaugeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Sensor address on the local link.
    pub host: String,
    /// TCP port of the sample feed.
    pub port: u16,
}

impl DeviceConfig {
    /// `host:port` endpoint string for the feed connection.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "192.168.4.1".to_string(),
            port: 8090,
        }
    }
}

/// Exercise thresholds in degrees. Must satisfy
/// `rest_threshold < rep_threshold < target_angle`; the motion core
/// re-validates before they take effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExerciseConfig {
    /// Angle above which a raise counts as started.
    pub rep_threshold: f32,
    /// Angle below which the limb is considered back at rest.
    pub rest_threshold: f32,
    /// Goal angle for quality scoring.
    pub target_angle: f32,
    /// Drop from the running peak that signals lowering.
    pub lowering_drop_delta: f32,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        // Lateral raise to roughly horizontal.
        Self {
            rep_threshold: 80.0,
            rest_threshold: 30.0,
            target_angle: 100.0,
            lowering_drop_delta: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Angle smoothing strategy. `Raw` tracks every sample; `Smoothed`
    /// blends 70% previous / 30% new for a steadier needle.
    pub angle_smoothing: SmoothingMode,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            angle_smoothing: SmoothingMode::Raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingMode {
    Raw,
    Smoothed,
}
