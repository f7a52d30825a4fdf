//! Title command handler.

use clap::Args;
use lumina_core::{config::AppConfig, AppResult};
use lumina_retrieval::resolve_title;

/// Generate a short conversation title
#[derive(Args, Debug)]
pub struct TitleCommand {
    /// First message of the conversation
    pub prompt: String,
}

impl TitleCommand {
    /// Execute the title command. Always prints a title.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing title command");

        let title = resolve_title(config, &self.prompt).await;
        println!("{}", title);

        Ok(())
    }
}
