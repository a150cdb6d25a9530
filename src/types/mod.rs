//! Core types for kbharvest.

pub mod observation;
pub mod resource;
pub mod session;

pub use observation::*;
pub use resource::*;
pub use session::*;
