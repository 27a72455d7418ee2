pub mod artifact;
pub mod config;
pub mod error;
pub mod generation;
pub mod session;
pub mod settings;

// Re-export common error type
pub use error::{ReelError, Result};
