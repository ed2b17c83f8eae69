use serde::{Deserialize, Serialize};

use crate::events::{Event, Track};

/// How a multi-track file is flattened into one event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeStrategy {
    /// Track 0 in full, then track 1, and so on. Timing across tracks is lost.
    #[default]
    Concatenate,
    /// Stable merge by absolute tick, deltas recomputed against the merged stream.
    Interleave,
}

pub fn merge_tracks(tracks: &[Track], strategy: MergeStrategy) -> Track {
    if tracks.len() == 1 {
        return tracks[0].clone();
    }

    let merged = match strategy {
        MergeStrategy::Concatenate => concatenate(tracks),
        MergeStrategy::Interleave => interleave(tracks),
    };

    tracing::info!(
        "Merged {} tracks into {} events ({:?})",
        tracks.len(),
        merged.len(),
        strategy
    );
    merged
}

fn concatenate(tracks: &[Track]) -> Track {
    tracks.iter().flatten().copied().collect()
}

fn interleave(tracks: &[Track]) -> Track {
    let mut timed: Vec<(u64, Event)> = Vec::with_capacity(tracks.iter().map(Vec::len).sum());

    for track in tracks {
        let mut abs_ticks: u64 = 0;
        for ev in track {
            abs_ticks += ev.delta as u64;
            timed.push((abs_ticks, *ev));
        }
    }

    // stable: equal ticks keep track order, then in-track order
    timed.sort_by_key(|(t, _)| *t);

    let mut last = 0u64;
    timed
        .into_iter()
        .map(|(t, ev)| {
            let delta = u32::try_from(t - last).unwrap_or(u32::MAX);
            last = t;
            Event { delta, ..ev }
        })
        .collect()
}
