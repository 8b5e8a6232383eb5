use anyhow::Result;
use formcoach_config::{AppConfig, SmoothingMode};
use formcoach_motion::estimator::AngleSmoothing;
use formcoach_motion::session::SessionConfig;
use formcoach_motion::tracker::TrackerConfig;
use formcoach_motion::types::{RepQuality, RepResult};
use formcoach_motion::SensorClient;
use std::time::Duration;
use tracing::{info, warn};

/// Seconds between live gauge log lines while waiting for reps.
const GAUGE_INTERVAL_SECS: u64 = 5;

/// Per-quality repetition counters for the end-of-session summary.
#[derive(Debug, Default)]
struct SessionTotals {
    great: u32,
    good: u32,
    needs_improvement: u32,
}

impl SessionTotals {
    fn record(&mut self, quality: RepQuality) {
        match quality {
            RepQuality::Great => self.great += 1,
            RepQuality::Good => self.good += 1,
            RepQuality::NeedsImprovement => self.needs_improvement += 1,
        }
    }

    fn total(&self) -> u32 {
        self.great + self.good + self.needs_improvement
    }
}

/// Vibration pulse count mirrored to the handset for a completed rep.
fn haptic_pulses(quality: RepQuality) -> u32 {
    match quality {
        RepQuality::Great => 1,
        RepQuality::Good => 2,
        RepQuality::NeedsImprovement => 3,
    }
}

fn coach_line(quality: RepQuality) -> &'static str {
    match quality {
        RepQuality::Great => "Great rep! Full range of motion.",
        RepQuality::Good => "Good rep. Reach a little higher next time.",
        RepQuality::NeedsImprovement => "Almost. Raise further toward the target.",
    }
}

/// Map the on-disk configuration onto the motion core's session config.
fn session_config(config: &AppConfig) -> SessionConfig {
    SessionConfig {
        tracker: TrackerConfig {
            rep_threshold: config.exercise.rep_threshold,
            rest_threshold: config.exercise.rest_threshold,
            target_angle: config.exercise.target_angle,
            lowering_drop_delta: config.exercise.lowering_drop_delta,
        },
        angle_smoothing: match config.gauge.angle_smoothing {
            SmoothingMode::Raw => AngleSmoothing::Raw,
            SmoothingMode::Smoothed => AngleSmoothing::Smoothed,
        },
    }
}

fn announce(rep: &RepResult, count: u32) {
    info!(
        rep = count,
        max_angle = rep.max_angle_reached,
        quality = rep.quality.label(),
        pulses = haptic_pulses(rep.quality),
        "Rep complete"
    );
    println!("Rep {count}: {}", coach_line(rep.quality));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formcoach_app=info,formcoach_motion=info".into()),
        )
        .init();

    info!("FormCoach session starting");

    // Load config.
    let config = formcoach_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        endpoint = %config.device.endpoint(),
        target = config.exercise.target_angle,
        "Config loaded"
    );

    // Connect to the wearable (fall back to mock if it is not reachable).
    let endpoint = config.device.endpoint();
    let mut client = match SensorClient::connect(&endpoint, session_config(&config)).await {
        Ok(client) => {
            info!("Sensor connected");
            client
        }
        Err(e) => {
            warn!(?e, "Sensor not reachable, using mock (no live feed)");
            SensorClient::mock()
        }
    };

    let readings = client.readings();
    let mut totals = SessionTotals::default();
    let mut gauge = tokio::time::interval(Duration::from_secs(GAUGE_INTERVAL_SECS));
    gauge.tick().await;

    loop {
        tokio::select! {
            rep = client.next_rep() => {
                match rep {
                    Some(rep) => {
                        totals.record(rep.quality);
                        announce(&rep, totals.total());
                    }
                    None => {
                        info!("Sensor feed ended");
                        break;
                    }
                }
            }
            _ = gauge.tick() => {
                let reading = *readings.borrow();
                info!(
                    angle = reading.angle,
                    momentum = reading.momentum,
                    "Live gauge"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Session stopped by user");
                break;
            }
        }
    }

    // Persist the active settings; creates the editable file on first run.
    if let Err(e) = formcoach_config::save_config(&config) {
        warn!(?e, "Failed to save config");
    }

    info!(
        total = totals.total(),
        great = totals.great,
        good = totals.good,
        needs_improvement = totals.needs_improvement,
        "Session summary"
    );
    println!(
        "Session done: {} reps ({} great, {} good, {} to improve)",
        totals.total(),
        totals.great,
        totals.good,
        totals.needs_improvement
    );

    Ok(())
}
