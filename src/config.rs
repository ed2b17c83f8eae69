use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{audio::Wave, error::Error, timing::MergeStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    Speaker,
    Wav(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// MIDI file to play
    pub path: PathBuf,
    /// > 1.0 plays faster, < 1.0 slower
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,
    #[serde(default)]
    pub merge: MergeStrategy,
    #[serde(default = "default_output")]
    pub output: Output,
    #[serde(default)]
    pub wave: Wave,
    /// 0.0 -> 1.0
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_speed_factor() -> f64 {
    1.0
}

fn default_output() -> Output {
    Output::Speaker
}

fn default_volume() -> f32 {
    0.2
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("speed factor must be a positive finite number, got {0}")]
    InvalidSpeedFactor(f64),

    #[error("volume must be in (0, 1], got {0}")]
    InvalidVolume(f32),

    #[error("{0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("{0}")]
    Serialize(#[from] ron::Error),
}

/// A validated playback rate multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedFactor(f64);

impl SpeedFactor {
    pub const NORMAL: SpeedFactor = SpeedFactor(1.0);

    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidSpeedFactor(value))
        }
    }

    /// `floor(ticks / factor)`, saturating.
    pub fn scale(self, ticks: u32) -> u64 {
        (ticks as f64 / self.0).floor() as u64
    }
}

impl Default for SpeedFactor {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl PlayerConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            speed_factor: default_speed_factor(),
            merge: MergeStrategy::default(),
            output: default_output(),
            wave: Wave::default(),
            volume: default_volume(),
        }
    }

    pub fn validate(&self) -> Result<SpeedFactor, ConfigError> {
        if !(self.volume > 0.0 && self.volume <= 1.0) {
            return Err(ConfigError::InvalidVolume(self.volume));
        }
        SpeedFactor::new(self.speed_factor)
    }

    pub fn save(&self, config_path: &Path) -> Result<(), Error> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::from)?;
        fs::write(config_path, ron_string).map_err(|source| Error::Io {
            path: config_path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    pub fn load(config_path: &Path) -> Result<Self, Error> {
        let ron_string = fs::read_to_string(config_path).map_err(|source| Error::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config: PlayerConfig = ron::from_str(&ron_string).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }
}
