//! The per-resource extraction loop (turns, events, reports).

pub mod events;
pub mod runner;
pub mod types;

pub use events::*;
pub use runner::*;
pub use types::*;
