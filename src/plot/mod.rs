//! Terminal plotting (deterministic ASCII grid).

pub mod ascii;

pub use ascii::*;
