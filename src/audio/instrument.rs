use serde::{Deserialize, Serialize};

/// Waveform of the tone generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wave {
    Sine,
    /// PC speaker sound
    #[default]
    Square,
    Saw,
}

impl Wave {
    /// Sample at `phase` in [0, 1), in [-1, 1].
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Wave::Sine => (phase * 2.0 * std::f32::consts::PI).sin(),
            Wave::Square => {
                if phase < 0.5 {
                    -1.0
                } else {
                    1.0
                }
            }
            Wave::Saw => phase * 2.0 - 1.0,
        }
    }
}
