use std::time::Duration;

use autonpath_routine::{Alliance, DriveModel, InjectionConfig, PreviewTiming, RoutineError};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Prefix of environment overrides, e.g. `AUTONPATH_VIEWER__BENCH=true`.
const ENV_PREFIX: &str = "AUTONPATH";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub drivetrain: DrivetrainSettings,
    pub injection: InjectionSettings,
    pub preview: PreviewSettings,
    pub viewer: ViewerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrivetrainSettings {
    pub drive_rpm: f64,
    pub wheel_diameter: f64,
    pub track_width: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InjectionSettings {
    pub lookahead: f64,
    pub max_iterations: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewSettings {
    pub start_hold_ms: u64,
    pub end_hold_ms: u64,
    pub idle_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerSettings {
    /// Routine selected at startup.
    pub routine: String,
    pub alliance: Alliance,
    /// Record against the simulated chassis in an autonomous state.
    pub bench: bool,
    /// Multiplier on simulated motion and delay time in bench mode.
    pub time_scale: f64,
    pub frame_capacity: usize,
}

impl Settings {
    pub fn drive_model(&self) -> Result<DriveModel, RoutineError> {
        let d = &self.drivetrain;
        Ok(DriveModel::new(d.drive_rpm, d.wheel_diameter, d.track_width)?)
    }

    pub fn injection_config(&self) -> Result<InjectionConfig, RoutineError> {
        InjectionConfig::new(self.injection.lookahead, self.injection.max_iterations)
    }

    pub fn preview_timing(&self) -> PreviewTiming {
        PreviewTiming {
            start_hold: Duration::from_millis(self.preview.start_hold_ms),
            end_hold: Duration::from_millis(self.preview.end_hold_ms),
            idle: Duration::from_millis(self.preview.idle_ms),
        }
    }
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .build()
        .and_then(|config| config.try_deserialize::<Settings>());

    match settings {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
