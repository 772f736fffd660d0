//! Run reports: terminal summaries, projection tables, and day markers.

pub mod format;
pub mod markers;

pub use format::*;
pub use markers::*;
