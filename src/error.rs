use std::path::PathBuf;

use crate::audio::ToneError;
use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed MIDI file: {0}")]
    Midi(#[from] midly::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Tone playback failed: {0}")]
    Tone(#[from] ToneError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
