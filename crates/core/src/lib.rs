//! Lumina Core Library
//!
//! This crate provides the foundational utilities shared by every Lumina crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Outbound HTTP client construction

pub mod config;
pub mod error;
pub mod http;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
