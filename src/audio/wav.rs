use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use super::{ToneEmitter, ToneError, Voice, Wave, duration_to_samples};

pub const WAV_SAMPLE_RATE: u32 = 44100;

/// Renders tones back to back into a mono 16-bit WAV file instead of a speaker.
pub struct WavEmitter {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    voice: Voice,
}

impl WavEmitter {
    pub fn create(path: &Path, wave: Wave, volume: f32) -> Result<Self, ToneError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: WAV_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path, spec)?;
        tracing::info!("Writing tones to {}", path.display());

        Ok(Self {
            writer: Some(writer),
            voice: Voice::new(wave, volume),
        })
    }
}

impl ToneEmitter for WavEmitter {
    fn play(&mut self, frequency: u32, duration: Duration) -> Result<(), ToneError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(ToneError::Wav(hound::Error::FormatError(
                "writer already finalized",
            )));
        };

        let sample_rate = WAV_SAMPLE_RATE as f32;
        self.voice
            .start(frequency, duration_to_samples(duration, sample_rate), sample_rate);

        while !self.voice.is_finished() {
            let sample = self.voice.render_sample();
            writer.write_sample((sample * i16::MAX as f32) as i16)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ToneError> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}
