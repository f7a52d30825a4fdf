//! Command handlers for the Lumina CLI.

pub mod ask;
pub mod config;
pub mod title;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use config::ConfigCommand;
pub use title::TitleCommand;
