use std::collections::HashMap;

use crate::events::{EventKind, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub pitch: u8,
    /// Ticks
    pub duration: u32,
}

/// Notes recovered from a track, plus everything that was thrown away on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// In the order their closing events appear.
    pub notes: Vec<Note>,
    /// Starts still open when the track ended.
    pub unmatched_starts: usize,
    /// Ends for a pitch that was not sounding.
    pub unmatched_ends: usize,
    /// Starts replaced by a later start on the same pitch before being closed.
    pub overwritten_starts: usize,
}

impl Extraction {
    pub fn discarded(&self) -> usize {
        self.unmatched_starts + self.unmatched_ends + self.overwritten_starts
    }
}

/// Pairs note-on/note-off events per pitch into timed notes.
///
/// The clock is reset at every start and every matched end, so a note's
/// duration is the gap before its start plus the gap before its end. A
/// note-on with zero velocity closes the pitch like a note-off.
pub fn extract_notes(track: &Track) -> Extraction {
    let mut extraction = Extraction::default();
    let mut open: HashMap<u8, u32> = HashMap::new();
    let mut current_time: u32 = 0;

    for event in track {
        current_time = current_time.saturating_add(event.delta);

        match event.kind {
            EventKind::NoteOn { pitch, velocity } if velocity > 0 => {
                if open.insert(pitch, current_time).is_some() {
                    extraction.overwritten_starts += 1;
                }
                current_time = 0;
            }
            EventKind::NoteOn { pitch, .. } | EventKind::NoteOff { pitch, .. } => {
                if let Some(start) = open.remove(&pitch) {
                    extraction.notes.push(Note {
                        pitch,
                        duration: start.saturating_add(current_time),
                    });
                    current_time = 0;
                } else {
                    extraction.unmatched_ends += 1;
                }
            }
            EventKind::Other => {}
        }
    }

    extraction.unmatched_starts = open.len();

    if extraction.discarded() > 0 {
        tracing::warn!(
            "Discarded events: {} unmatched start(s), {} unmatched end(s), {} overwritten start(s)",
            extraction.unmatched_starts,
            extraction.unmatched_ends,
            extraction.overwritten_starts
        );
    }
    tracing::info!("Extracted {} note(s)", extraction.notes.len());

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;

    #[test]
    fn single_note() {
        let track = vec![Event::note_on(0, 60, 64), Event::note_off(480, 60)];

        let extraction = extract_notes(&track);
        assert_eq!(
            extraction.notes,
            vec![Note {
                pitch: 60,
                duration: 480
            }]
        );
        assert_eq!(extraction.discarded(), 0);
    }

    #[test]
    fn zero_velocity_note_on_closes_note() {
        let track = vec![Event::note_on(0, 72, 100), Event::note_on(120, 72, 0)];

        let extraction = extract_notes(&track);
        assert_eq!(
            extraction.notes,
            vec![Note {
                pitch: 72,
                duration: 120
            }]
        );
    }

    #[test]
    fn gap_before_start_counts_towards_duration() {
        let track = vec![
            Event::note_on(0, 60, 64),
            Event::note_off(100, 60),
            Event::note_on(50, 62, 64),
            Event::note_off(100, 62),
        ];

        let notes = extract_notes(&track).notes;
        assert_eq!(notes[0].duration, 100);
        assert_eq!(notes[1].duration, 150);
    }

    #[test]
    fn other_events_advance_the_clock() {
        let track = vec![
            Event::other(30),
            Event::note_on(10, 60, 64),
            Event::other(200),
            Event::note_off(40, 60),
        ];

        assert_eq!(extract_notes(&track).notes[0].duration, 40 + 240);
    }

    #[test]
    fn unmatched_start_is_dropped() {
        let track = vec![
            Event::note_on(0, 60, 64),
            Event::note_on(0, 64, 64),
            Event::note_off(480, 60),
        ];

        let extraction = extract_notes(&track);
        assert_eq!(extraction.notes.len(), 1);
        assert_eq!(extraction.notes[0].pitch, 60);
        assert_eq!(extraction.unmatched_starts, 1);
    }

    #[test]
    fn unmatched_end_is_ignored_and_keeps_clock() {
        let track = vec![
            Event::note_on(0, 60, 64),
            Event::note_off(100, 61),
            Event::note_off(100, 60),
        ];

        let extraction = extract_notes(&track);
        assert_eq!(
            extraction.notes,
            vec![Note {
                pitch: 60,
                duration: 200
            }]
        );
        assert_eq!(extraction.unmatched_ends, 1);
    }

    #[test]
    fn second_start_overwrites_first() {
        let track = vec![
            Event::note_on(10, 60, 64),
            Event::note_on(20, 60, 64),
            Event::note_off(30, 60),
            Event::note_off(0, 60),
        ];

        let extraction = extract_notes(&track);
        // the surviving start was recorded at clock 20
        assert_eq!(
            extraction.notes,
            vec![Note {
                pitch: 60,
                duration: 50
            }]
        );
        assert_eq!(extraction.overwritten_starts, 1);
        assert_eq!(extraction.unmatched_ends, 1);
    }

    #[test]
    fn notes_follow_end_order() {
        let track = vec![
            Event::note_on(0, 60, 64),
            Event::note_on(0, 64, 64),
            Event::note_off(100, 64),
            Event::note_off(100, 60),
        ];

        let pitches: Vec<u8> = extract_notes(&track).notes.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![64, 60]);
    }

    #[test]
    fn empty_track() {
        assert_eq!(extract_notes(&Vec::new()), Extraction::default());
    }
}
