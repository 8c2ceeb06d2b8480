//! Core types for curia.

pub mod generation;
pub mod io;
pub mod message;
pub mod usage;

pub use generation::*;
pub use io::*;
pub use message::*;
pub use usage::*;
