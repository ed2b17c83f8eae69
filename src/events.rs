/// A single track event with its delta from the previous event in the same track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Ticks
    pub delta: u32,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8, velocity: u8 },
    /// Meta, SysEx and non-note channel messages. Only the delta matters.
    Other,
}

pub type Track = Vec<Event>;

impl Event {
    pub fn note_on(delta: u32, pitch: u8, velocity: u8) -> Self {
        Self {
            delta,
            kind: EventKind::NoteOn { pitch, velocity },
        }
    }

    pub fn note_off(delta: u32, pitch: u8) -> Self {
        Self {
            delta,
            kind: EventKind::NoteOff { pitch, velocity: 0 },
        }
    }

    pub fn other(delta: u32) -> Self {
        Self {
            delta,
            kind: EventKind::Other,
        }
    }
}
