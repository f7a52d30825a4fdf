//! Config command handler.
//!
//! Prints the effective configuration after file, environment and flag
//! layering. The API key is never printed.

use clap::Args;
use lumina_core::{config::AppConfig, AppResult};

/// Print the effective configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Output as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

impl ConfigCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing config command");

        if self.json {
            let mut value = serde_json::to_value(config)?;
            value["apiKeyConfigured"] = serde_json::Value::Bool(config.require_api_key().is_ok());
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            print!("{}", serde_yaml::to_string(config)?);
            println!("# api key: {}", key_status(config));
        }

        if let Err(e) = config.validate() {
            tracing::warn!("Configuration is not usable: {}", e);
        }

        Ok(())
    }
}

fn key_status(config: &AppConfig) -> &'static str {
    if config.require_api_key().is_ok() {
        "configured"
    } else {
        "missing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_status_never_reveals_key() {
        let mut config = AppConfig::default();
        assert_eq!(key_status(&config), "missing");

        config.api_key = Some("secret-value".to_string());
        assert_eq!(key_status(&config), "configured");

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret-value"));
    }
}
