//! Utility modules: name normalization, timeout.

pub mod naming;
pub mod timeout;

pub use naming::normalize_name;
pub use timeout::with_timeout;
