//! Crowd Watch configuration

use crate::error::AppError;
use alerting::{AlertClassifier, AlertSink, CommandSink, DensityBand, DensityTable, LogSink, DEFAULT_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the config file looked up in the working directory
pub const DEFAULT_CONFIG_NAME: &str = "crowd-watch";

/// Prefix for environment overrides, e.g. `CROWD_WATCH__TASK=violence_detection`
pub const ENV_PREFIX: &str = "CROWD_WATCH";

/// Detection task, which selects the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    #[default]
    CrowdDetection,
    ViolenceDetection,
}

/// Kind of media the detector reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Image,
    Video,
    Webcam,
    Rtsp,
    Youtube,
}

impl SourceKind {
    /// Whether this source needs a path or URL to be useful
    pub fn needs_locator(&self) -> bool {
        matches!(self, SourceKind::Video | SourceKind::Rtsp | SourceKind::Youtube)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Built-in density tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TablePreset {
    /// Gap-free thresholds
    #[default]
    Contiguous,
    /// Thresholds with the 1/10/50 gaps of the original demo
    Legacy,
}

/// Model weight locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub crowd: PathBuf,
    pub violence: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            crowd: PathBuf::from("weights/crowd.pt"),
            violence: PathBuf::from("weights/violence.pt"),
        }
    }
}

/// Media source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// File path, device index or stream URL
    pub locator: Option<String>,
}

/// Alert settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Built-in table used when `bands` is not set
    pub table: TablePreset,
    /// Explicit density bands, overriding `table`
    pub bands: Option<Vec<DensityBand>>,
    /// Flag violence only for a positive count rather than on key presence
    pub violence_requires_count: bool,
    /// Alarm sound played on alerts
    pub sound_file: PathBuf,
    /// Audio player command; alerts are only logged when unset
    pub player: Option<String>,
    pub player_args: Vec<String>,
    /// Alerts that may wait for the player
    pub queue_capacity: usize,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            table: TablePreset::Contiguous,
            bands: None,
            violence_requires_count: false,
            sound_file: PathBuf::from("mixkit-classic-alarm-995.wav"),
            player: None,
            player_args: Vec::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub task: Task,
    /// Model confidence in percent (25..=100)
    pub confidence_percent: u8,
    pub models: ModelPaths,
    pub source: SourceConfig,
    pub alerting: AlertingConfig,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            task: Task::CrowdDetection,
            confidence_percent: 40,
            models: ModelPaths::default(),
            source: SourceConfig::default(),
            alerting: AlertingConfig::default(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, a config file and the environment.
    ///
    /// With `path` set the file must exist; otherwise `crowd-watch.*` in the
    /// working directory is read if present. Environment variables override
    /// the file.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        Self::load_with_env(path, Self::environment())
    }

    /// Environment source; `player_args` is split on spaces
    fn environment() -> ::config::Environment {
        ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(" ")
            .with_list_parse_key("alerting.player_args")
    }

    fn load_with_env(path: Option<&Path>, env: ::config::Environment) -> Result<Self, AppError> {
        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config: AppConfig = ::config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values the type system does not cover
    pub fn validate(&self) -> Result<(), AppError> {
        if !(25..=100).contains(&self.confidence_percent) {
            return Err(AppError::InvalidConfidence(self.confidence_percent));
        }
        self.density_table()?;
        Ok(())
    }

    /// Confidence as a fraction
    pub fn confidence(&self) -> f32 {
        f32::from(self.confidence_percent) / 100.0
    }

    /// Weights for the selected task
    pub fn model_path(&self) -> &Path {
        match self.task {
            Task::CrowdDetection => &self.models.crowd,
            Task::ViolenceDetection => &self.models.violence,
        }
    }

    /// Density table from explicit bands or the chosen preset
    pub fn density_table(&self) -> Result<DensityTable, AppError> {
        match &self.alerting.bands {
            Some(bands) => Ok(DensityTable::new(bands.clone())?),
            None => Ok(match self.alerting.table {
                TablePreset::Contiguous => DensityTable::contiguous(),
                TablePreset::Legacy => DensityTable::legacy(),
            }),
        }
    }

    /// Classifier over the configured table and violence rule
    pub fn classifier(&self) -> Result<AlertClassifier, AppError> {
        Ok(AlertClassifier::new(self.density_table()?)
            .with_violence_requires_count(self.alerting.violence_requires_count))
    }

    /// Sink for alert playback
    pub fn alert_sink(&self) -> Arc<dyn AlertSink> {
        match &self.alerting.player {
            Some(player) => Arc::new(CommandSink::new(
                player.clone(),
                self.alerting.player_args.clone(),
                self.alerting.sound_file.clone(),
            )),
            None => Arc::new(LogSink),
        }
    }

    /// Log the effective settings
    pub fn log_summary(&self) {
        info!(
            "Task: {:?}, model: {}, confidence: {:.2}",
            self.task,
            self.model_path().display(),
            self.confidence()
        );
        info!(
            "Source: {:?} {}",
            self.source.kind,
            self.source.locator.as_deref().unwrap_or("(default)")
        );
        if self.source.kind.needs_locator() && self.source.locator.is_none() {
            warn!("Source {:?} has no locator configured", self.source.kind);
        }
        match &self.alerting.player {
            Some(player) => info!(
                "Alerts play {} with {}",
                self.alerting.sound_file.display(),
                player
            ),
            None => info!("No audio player configured, alerts are logged only"),
        }
    }
}
