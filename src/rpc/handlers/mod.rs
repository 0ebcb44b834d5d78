//! Handler module declarations and re-exports

pub mod file;
pub mod stipple;

// Re-export all handlers for convenient access
pub use file::*;
pub use stipple::*;
