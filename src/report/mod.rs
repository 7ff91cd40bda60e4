//! Report module - terminal rendering of runs and previews

pub mod preview;
pub mod summary;

pub use preview::*;
pub use summary::*;
