//! Input/output helpers.
//!
//! - day-by-day result exports (CSV) (`export`)
//! - projection JSON read/write (`curve`)

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;
