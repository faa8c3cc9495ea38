//! Shared helpers for command implementations.

pub mod logging;
pub mod paths;

pub use logging::initialize_logging;
