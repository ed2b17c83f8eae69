mod merge;
mod notes;

pub use merge::{MergeStrategy, merge_tracks};
pub use notes::{Extraction, Note, extract_notes};
