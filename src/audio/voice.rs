use super::Wave;

/// Seconds
const FADE: f32 = 0.005;

/// One fixed-frequency tone being rendered, with a linear fade at both ends.
#[derive(Debug, Clone)]
pub struct Voice {
    pub wave: Wave,
    pub volume: f32,
    freq: f32,
    phase: f32,
    position: u64,
    total_samples: u64,
    fade_samples: u64,
}

impl Voice {
    pub fn new(wave: Wave, volume: f32) -> Self {
        Self {
            wave,
            volume,
            freq: 0.0,
            phase: 0.0,
            position: 0,
            total_samples: 0,
            fade_samples: 0,
        }
    }

    /// Starts a new tone, discarding whatever was left of the previous one.
    pub fn start(&mut self, frequency: u32, total_samples: u64, sample_rate: f32) {
        self.freq = frequency as f32 / sample_rate;
        self.phase = 0.0;
        self.position = 0;
        self.total_samples = total_samples;
        self.fade_samples = ((FADE * sample_rate) as u64).min(total_samples / 2);
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.total_samples
    }

    /// Next sample, or silence once the tone is over.
    pub fn render_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }

        let sample = self.wave.sample(self.phase) * self.envelope() * self.volume;

        self.phase += self.freq;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        self.position += 1;

        sample
    }

    fn envelope(&self) -> f32 {
        if self.fade_samples == 0 {
            return 1.0;
        }
        let remaining = self.total_samples - self.position;
        let edge = self.position.min(remaining);
        if edge >= self.fade_samples {
            1.0
        } else {
            edge as f32 / self.fade_samples as f32
        }
    }
}

pub fn duration_to_samples(duration: std::time::Duration, sample_rate: f32) -> u64 {
    (duration.as_secs_f64() * sample_rate as f64).round() as u64
}
