pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod midi_file;
pub mod timing;

pub use audio::{SpeakerEmitter, ToneEmitter, ToneError, WavEmitter, Wave, pitch_to_frequency};
pub use config::{ConfigError, Output, PlayerConfig, SpeedFactor};
pub use engine::{PlaybackSummary, diagnostic_line, play_file, play_notes, run};
pub use error::{Error, Result};
pub use events::{Event, EventKind, Track};
pub use midi_file::MidiFile;
pub use timing::{Extraction, MergeStrategy, Note, extract_notes, merge_tracks};
