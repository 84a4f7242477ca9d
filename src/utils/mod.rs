//! Utility modules for error handling and configuration

pub mod config;
pub mod error;
pub mod platform;

// Re-export for convenience
pub use config::ExtractorSettings;
pub use error::{ExtractError, Result};
