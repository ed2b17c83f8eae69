mod instrument;
mod speaker;
mod voice;
mod wav;

use std::time::Duration;

pub use instrument::Wave;
pub use speaker::SpeakerEmitter;
pub use voice::{Voice, duration_to_samples};
pub use wav::WavEmitter;

/// Concert A, pitch 69.
const A4_FREQ: f64 = 440.0;

/// Equal-tempered frequency of a MIDI pitch, rounded to the nearest Hz.
/// Saturates outside the range of `u32`.
pub fn pitch_to_frequency(pitch: i32) -> u32 {
    (A4_FREQ * 2.0_f64.powf((pitch as f64 - 69.0) / 12.0)).round() as u32
}

/// Something that can sound a single frequency for a while.
pub trait ToneEmitter {
    /// Blocks until the whole tone has been emitted.
    fn play(&mut self, frequency: u32, duration: Duration) -> Result<(), ToneError>;

    /// Called once after the last tone.
    fn finish(&mut self) -> Result<(), ToneError> {
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToneError {
    #[error("No output device")]
    NoOutputDevice,

    #[error("Unsupported output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Output stream failed: {0}")]
    Stream(String),

    #[error("Tone of {0:?} did not finish in time")]
    Timeout(Duration),

    #[error("Failed to write WAV output: {0}")]
    Wav(#[from] hound::Error),
}
