use crate::core::{
    DEFAULT_MAXIMUM_AGE_MS, DEFAULT_TIMEOUT_MS, HISTORY_CAPACITY, MAX_HISTORY_CAPACITY,
    RENDER_DELAY_FACTOR, SAMPLING_PERIOD_ESTIMATE_MS,
};
use crate::processing::Extrapolation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Options handed to the positioning source when tracking starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingOptions {
    /// Maximum age of a cached fix the source may return (milliseconds)
    pub maximum_age_ms: u32,
    /// Request the most accurate fixes the device can produce
    pub enable_high_accuracy: bool,
    /// Time allowed for a fix before the source reports a timeout (milliseconds)
    pub timeout_ms: u32,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            maximum_age_ms: DEFAULT_MAXIMUM_AGE_MS,
            enable_high_accuracy: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Parameters of the delayed, interpolated view update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Assumed interval between fixes (milliseconds)
    pub sampling_period_ms: f64,
    /// Use the history's measured mean interval instead of the assumed one
    pub adaptive_sampling_period: bool,
    /// Render delay as a multiple of the sampling period
    pub delay_factor: f64,
    /// Number of samples kept for interpolation
    pub history_capacity: usize,
    /// Hold the nearest sample when the delayed query falls outside the history
    pub extrapolate: bool,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            sampling_period_ms: SAMPLING_PERIOD_ESTIMATE_MS,
            adaptive_sampling_period: false,
            delay_factor: RENDER_DELAY_FACTOR,
            history_capacity: HISTORY_CAPACITY,
            extrapolate: true,
        }
    }
}

impl SmoothingConfig {
    pub fn extrapolation(&self) -> Extrapolation {
        if self.extrapolate {
            Extrapolation::Clamp
        } else {
            Extrapolation::None
        }
    }
}

/// Configuration captured when a geolocation control is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewFollowConfig {
    /// Draw a marker at the tracked position
    pub show_marker: bool,
    /// Recenter and rotate the view along the direction of travel
    pub follow: bool,
    pub tracking_options: TrackingOptions,
    pub smoothing: SmoothingConfig,
}

impl Default for ViewFollowConfig {
    fn default() -> Self {
        Self {
            show_marker: true,
            follow: false,
            tracking_options: TrackingOptions::default(),
            smoothing: SmoothingConfig::default(),
        }
    }
}

impl ViewFollowConfig {
    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    pub fn with_marker(mut self, show_marker: bool) -> Self {
        self.show_marker = show_marker;
        self
    }

    pub fn with_tracking_options(mut self, options: TrackingOptions) -> Self {
        self.tracking_options = options;
        self
    }

    pub fn with_smoothing(mut self, smoothing: SmoothingConfig) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Check every parameter, reporting the first invalid one
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tracking_options.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "tracking_options.timeout_ms",
                self.tracking_options.timeout_ms,
                "timeout must be greater than zero",
            ));
        }

        let smoothing = &self.smoothing;
        if !smoothing.sampling_period_ms.is_finite() || smoothing.sampling_period_ms <= 0.0 {
            return Err(ConfigError::invalid(
                "smoothing.sampling_period_ms",
                smoothing.sampling_period_ms,
                "sampling period must be a positive number of milliseconds",
            ));
        }

        if !smoothing.delay_factor.is_finite() || smoothing.delay_factor < 0.0 {
            return Err(ConfigError::invalid(
                "smoothing.delay_factor",
                smoothing.delay_factor,
                "delay factor must be zero or positive",
            ));
        }

        if smoothing.history_capacity < 2 {
            return Err(ConfigError::invalid(
                "smoothing.history_capacity",
                smoothing.history_capacity,
                "interpolation needs at least two samples",
            ));
        }

        if smoothing.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::invalid(
                "smoothing.history_capacity",
                smoothing.history_capacity,
                "history capacity must not exceed 10000 samples",
            ));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("failed to access config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no file path set for saving configuration")]
    NoFilePath,
}

impl ConfigError {
    fn invalid(parameter: &str, value: impl ToString, reason: &str) -> Self {
        ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads, validates and persists a [`ViewFollowConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    config: ViewFollowConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a manager holding the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and load its configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    /// Parse and validate a JSON configuration; omitted fields take defaults
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: ViewFollowConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(Self {
            config,
            config_file_path: None,
            is_modified: false,
        })
    }

    pub fn config(&self) -> &ViewFollowConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: ViewFollowConfig) -> ConfigResult<()> {
        config.validate()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    pub fn set_follow(&mut self, follow: bool) {
        self.config.follow = follow;
        self.is_modified = true;
    }

    pub fn set_show_marker(&mut self, show_marker: bool) {
        self.config.show_marker = show_marker;
        self.is_modified = true;
    }

    /// Update the positioning source options, returning the previous ones
    pub fn set_tracking_options(&mut self, options: TrackingOptions) -> ConfigResult<TrackingOptions> {
        let candidate = self.config.clone().with_tracking_options(options);
        candidate.validate()?;
        let previous = std::mem::replace(&mut self.config, candidate).tracking_options;
        self.is_modified = true;
        Ok(previous)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> ConfigResult<()> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;

        let config: ViewFollowConfig = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path_str, follow = config.follow, show_marker = config.show_marker, "configuration loaded");
        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> ConfigResult<()> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = self.to_json()?;

        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;

        debug!(path = %path_str, "configuration saved");
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was last loaded from or saved to
    pub fn save(&mut self) -> ConfigResult<()> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::NoFilePath),
        }
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(&self.config)?)
    }

    /// Check if configuration has been modified since last load or save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }
}
