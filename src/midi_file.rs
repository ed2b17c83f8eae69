use std::fs;
use std::path::Path;

use midly::{MidiMessage, Smf, Timing, TrackEventKind};

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    SingleTrack,
    Parallel,
    Sequential,
}

/// A decoded Standard MIDI File, owned and detached from the source bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiFile {
    pub format: Format,
    /// `None` for SMPTE timecode files. Informational only, no tempo map is applied.
    pub ticks_per_beat: Option<u16>,
    pub tracks: Vec<Track>,
}

impl MidiFile {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::parse(&bytes)?;

        tracing::info!(
            "Loaded {}: {} track(s), {} event(s)",
            path.display(),
            file.tracks.len(),
            file.event_count()
        );
        Ok(file)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let smf = Smf::parse(bytes)?;

        let format = match smf.header.format {
            midly::Format::SingleTrack => Format::SingleTrack,
            midly::Format::Parallel => Format::Parallel,
            midly::Format::Sequential => Format::Sequential,
        };
        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => Some(tpb.as_int()),
            Timing::Timecode(..) => None,
        };

        let tracks = smf
            .tracks
            .iter()
            .map(|track| {
                track
                    .iter()
                    .map(|ev| Event {
                        delta: ev.delta.as_int(),
                        kind: decode_kind(&ev.kind),
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            format,
            ticks_per_beat,
            tracks,
        })
    }

    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(Vec::len).sum()
    }
}

fn decode_kind(kind: &TrackEventKind<'_>) -> EventKind {
    match kind {
        TrackEventKind::Midi { message, .. } => match *message {
            MidiMessage::NoteOn { key, vel } => EventKind::NoteOn {
                pitch: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::NoteOff { key, vel } => EventKind::NoteOff {
                pitch: key.as_int(),
                velocity: vel.as_int(),
            },
            _ => EventKind::Other,
        },
        _ => EventKind::Other,
    }
}
