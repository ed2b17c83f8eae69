use std::time::Duration;

use crate::audio::{self, SpeakerEmitter, ToneEmitter, WavEmitter};
use crate::config::{Output, PlayerConfig, SpeedFactor};
use crate::error::Result;
use crate::midi_file::MidiFile;
use crate::timing::{self, Note};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub played: usize,
    /// Notes whose scaled duration came out as zero.
    pub skipped: usize,
    /// Milliseconds of tone emitted, saturating.
    pub total_ms: u64,
    /// Starts still open when the track ended.
    pub unmatched_starts: usize,
    /// Ends for a pitch that was not sounding.
    pub unmatched_ends: usize,
    /// Starts replaced by a later start on the same pitch.
    pub overwritten_starts: usize,
}

/// The console line printed for every note, sounded or not.
pub fn diagnostic_line(note: &Note, adjusted_duration: u64) -> String {
    format!("note: {}, duration: {}", note.pitch, adjusted_duration)
}

/// Plays notes one after another, each blocking until its tone is done.
///
/// Prints `note: {pitch}, duration: {ms}` per note. The first emitter
/// failure stops playback and nothing after it is played.
pub fn play_notes(
    notes: &[Note],
    speed: SpeedFactor,
    emitter: &mut dyn ToneEmitter,
) -> Result<PlaybackSummary> {
    let mut summary = PlaybackSummary::default();

    for note in notes {
        let adjusted_duration = speed.scale(note.duration);
        println!("{}", diagnostic_line(note, adjusted_duration));

        if adjusted_duration == 0 {
            summary.skipped += 1;
            continue;
        }

        let frequency = audio::pitch_to_frequency(note.pitch as i32);
        tracing::debug!(
            "Playing pitch {} at {} Hz for {} ms",
            note.pitch,
            frequency,
            adjusted_duration
        );
        emitter.play(frequency, Duration::from_millis(adjusted_duration))?;

        summary.played += 1;
        summary.total_ms = summary.total_ms.saturating_add(adjusted_duration);
    }

    emitter.finish()?;
    Ok(summary)
}

/// Load, merge, extract and play, with the emitter described by the config.
pub fn run(config: &PlayerConfig) -> Result<PlaybackSummary> {
    let speed = config.validate()?;
    let file = MidiFile::load(&config.path)?;

    let mut emitter: Box<dyn ToneEmitter> = match &config.output {
        Output::Speaker => Box::new(SpeakerEmitter::new(config.wave, config.volume)?),
        Output::Wav(path) => Box::new(WavEmitter::create(path, config.wave, config.volume)?),
    };

    play_file(&file, config, speed, emitter.as_mut())
}

/// The pipeline after loading, against any emitter.
pub fn play_file(
    file: &MidiFile,
    config: &PlayerConfig,
    speed: SpeedFactor,
    emitter: &mut dyn ToneEmitter,
) -> Result<PlaybackSummary> {
    let track = timing::merge_tracks(&file.tracks, config.merge);
    let extraction = timing::extract_notes(&track);

    let summary = PlaybackSummary {
        unmatched_starts: extraction.unmatched_starts,
        unmatched_ends: extraction.unmatched_ends,
        overwritten_starts: extraction.overwritten_starts,
        ..play_notes(&extraction.notes, speed, emitter)?
    };
    tracing::info!(
        "Played {} note(s), skipped {}, {} ms total",
        summary.played,
        summary.skipped,
        summary.total_ms
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ToneError;
    use crate::config::ConfigError;
    use crate::error::Error;
    use crate::midi_file::tests::{SIMPLE_TRACK, smf_bytes};

    #[derive(Default)]
    struct RecordingEmitter {
        tones: Vec<(u32, Duration)>,
        fail_after: Option<usize>,
        finished: bool,
    }

    impl ToneEmitter for RecordingEmitter {
        fn play(&mut self, frequency: u32, duration: Duration) -> Result<(), ToneError> {
            if self.fail_after == Some(self.tones.len()) {
                return Err(ToneError::NoOutputDevice);
            }
            self.tones.push((frequency, duration));
            Ok(())
        }

        fn finish(&mut self) -> Result<(), ToneError> {
            self.finished = true;
            Ok(())
        }
    }

    fn notes() -> Vec<Note> {
        vec![
            Note {
                pitch: 60,
                duration: 480,
            },
            Note {
                pitch: 69,
                duration: 1,
            },
            Note {
                pitch: 81,
                duration: 240,
            },
        ]
    }

    #[test]
    fn plays_notes_in_order() {
        let mut emitter = RecordingEmitter::default();

        let summary = play_notes(&notes(), SpeedFactor::NORMAL, &mut emitter).unwrap();

        assert_eq!(
            emitter.tones,
            vec![
                (262, Duration::from_millis(480)),
                (440, Duration::from_millis(1)),
                (880, Duration::from_millis(240)),
            ]
        );
        assert!(emitter.finished);
        assert_eq!(summary.played, 3);
        assert_eq!(summary.total_ms, 721);
    }

    #[test]
    fn zero_length_notes_are_skipped() {
        let mut emitter = RecordingEmitter::default();

        let speed = SpeedFactor::new(2.0).unwrap();
        let summary = play_notes(&notes(), speed, &mut emitter).unwrap();

        assert_eq!(
            emitter.tones,
            vec![
                (262, Duration::from_millis(240)),
                (880, Duration::from_millis(120)),
            ]
        );
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn emitter_failure_stops_playback() {
        let mut emitter = RecordingEmitter {
            fail_after: Some(1),
            ..Default::default()
        };

        let err = play_notes(&notes(), SpeedFactor::NORMAL, &mut emitter).unwrap_err();

        assert!(matches!(err, Error::Tone(ToneError::NoOutputDevice)));
        assert_eq!(emitter.tones.len(), 1);
        assert!(!emitter.finished);
    }

    #[test]
    fn end_to_end_normal_speed() {
        let file = MidiFile::parse(&smf_bytes(&[SIMPLE_TRACK])).unwrap();
        let config = PlayerConfig::new("unused.mid");
        let mut emitter = RecordingEmitter::default();

        play_file(&file, &config, SpeedFactor::NORMAL, &mut emitter).unwrap();

        assert_eq!(emitter.tones, vec![(262, Duration::from_millis(480))]);
    }

    #[test]
    fn end_to_end_double_speed() {
        let file = MidiFile::parse(&smf_bytes(&[SIMPLE_TRACK])).unwrap();
        let config = PlayerConfig::new("unused.mid");
        let mut emitter = RecordingEmitter::default();

        let speed = SpeedFactor::new(2.0).unwrap();
        play_file(&file, &config, speed, &mut emitter).unwrap();

        assert_eq!(emitter.tones, vec![(262, Duration::from_millis(240))]);
    }

    #[test]
    fn diagnostic_line_for_double_speed() {
        let file = MidiFile::parse(&smf_bytes(&[SIMPLE_TRACK])).unwrap();
        let notes = timing::extract_notes(&file.tracks[0]).notes;
        let speed = SpeedFactor::new(2.0).unwrap();

        let lines: Vec<String> = notes
            .iter()
            .map(|note| diagnostic_line(note, speed.scale(note.duration)))
            .collect();
        assert_eq!(lines, vec!["note: 60, duration: 240"]);
    }

    #[test]
    fn tiny_speed_factor_saturates_total() {
        let mut emitter = RecordingEmitter::default();
        let speed = SpeedFactor::new(1e-20).unwrap();

        let summary = play_notes(&notes(), speed, &mut emitter).unwrap();

        assert_eq!(summary.played, 3);
        assert_eq!(summary.total_ms, u64::MAX);
        assert_eq!(emitter.tones[0].1, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn summary_reports_discarded_events() {
        // NoteOn 60, stray NoteOff 61, NoteOn 64 never closed, NoteOff 60
        let body: &[u8] = &[
            0x00, 0x90, 60, 64, //
            0x10, 0x80, 61, 0, //
            0x00, 0x90, 64, 64, //
            0x20, 0x80, 60, 0, //
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let file = MidiFile::parse(&smf_bytes(&[body])).unwrap();
        let config = PlayerConfig::new("unused.mid");
        let mut emitter = RecordingEmitter::default();

        let summary = play_file(&file, &config, SpeedFactor::NORMAL, &mut emitter).unwrap();

        assert_eq!(summary.played, 1);
        assert_eq!(summary.unmatched_ends, 1);
        assert_eq!(summary.unmatched_starts, 1);
        assert_eq!(summary.overwritten_starts, 0);
    }

    #[test]
    fn multi_track_files_are_concatenated() {
        // second track: NoteOn 69 after 100 ticks, NoteOff 200 ticks later
        let second: &[u8] = &[
            0x64, 0x90, 69, 80, //
            0x81, 0x48, 0x80, 69, 0, //
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let file = MidiFile::parse(&smf_bytes(&[SIMPLE_TRACK, second])).unwrap();
        let config = PlayerConfig::new("unused.mid");
        let mut emitter = RecordingEmitter::default();

        play_file(&file, &config, SpeedFactor::NORMAL, &mut emitter).unwrap();

        assert_eq!(
            emitter.tones,
            vec![
                (262, Duration::from_millis(480)),
                (440, Duration::from_millis(300)),
            ]
        );
    }

    #[test]
    fn run_rejects_bad_speed_before_loading() {
        let mut config = PlayerConfig::new("does-not-exist.mid");
        config.speed_factor = -1.0;

        let err = run(&config).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidSpeedFactor(_))
        ));
    }

    #[test]
    fn run_writes_wav_output() {
        let dir = tempfile::tempdir().unwrap();
        let midi_path = dir.path().join("song.mid");
        let wav_path = dir.path().join("song.wav");
        std::fs::write(&midi_path, smf_bytes(&[SIMPLE_TRACK])).unwrap();

        let mut config = PlayerConfig::new(&midi_path);
        config.output = Output::Wav(wav_path.clone());

        let summary = run(&config).unwrap();
        assert_eq!(summary.played, 1);
        assert_eq!(summary.total_ms, 480);

        let reader = hound::WavReader::open(&wav_path).unwrap();
        assert_eq!(reader.duration(), 21168);
    }
}
