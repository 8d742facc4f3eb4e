//! Windowing and grouping over a flat list of timestamped content items.
//!
//! Every function here is pure: it takes a snapshot of items plus a range and
//! returns a freshly built result. Callers recompute whenever their inputs change.

pub mod chunks;
pub mod filter;
pub mod groups;
pub mod segments;
pub mod time;

pub use chunks::{build_chunks, chunk_id, DEFAULT_CHUNK_MS};
pub use filter::{filter_to_range, filter_to_window, sort_and_fill_frames, DEFAULT_WINDOW_MS};
pub use groups::{group_runs, GroupNavigator};
pub use segments::build_segments;
