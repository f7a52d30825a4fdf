//! Configuration management for Lumina.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.lumina/config.yaml` in the workspace, or `LUMINA_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The result is read once at startup and treated as immutable afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Environment variable holding the generative provider key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .lumina/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// API key for the generative provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log line format ("pretty" or "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Optional persona definition file
    pub persona_file: Option<PathBuf>,

    /// Generative provider settings
    pub gemini: GeminiSettings,

    /// Link crawler settings
    pub crawler: CrawlerSettings,

    /// Fallback search provider settings
    pub fallback: FallbackSettings,

    /// Whole-request settings
    pub pipeline: PipelineSettings,
}

/// Generative provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub endpoint: String,
    pub model: String,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Link crawler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Maximum characters of page text kept
    #[serde(rename = "maxChars")]
    pub max_chars: usize,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            max_chars: 8_000,
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Fallback search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    /// Base URL of the MediaWiki action API host
    #[serde(rename = "wikipediaApi")]
    pub wikipedia_api: String,
    /// Base URL of the Wikipedia REST API host
    #[serde(rename = "wikipediaRest")]
    pub wikipedia_rest: String,
    #[serde(rename = "duckduckgoApi")]
    pub duckduckgo_api: String,
    /// Number of articles summarized by the knowledge-base provider
    #[serde(rename = "topN")]
    pub top_n: usize,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            wikipedia_api: "https://en.wikipedia.org".to_string(),
            wikipedia_rest: "https://en.wikipedia.org".to_string(),
            duckduckgo_api: "https://api.duckduckgo.com".to_string(),
            top_n: 3,
            timeout_secs: 10,
        }
    }
}

/// Whole-request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// End-to-end deadline for one answer
    #[serde(rename = "deadlineSecs")]
    pub deadline_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { deadline_secs: 45 }
    }
}

impl GeminiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CrawlerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FallbackSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PipelineSettings {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    gemini: Option<GeminiSettings>,
    crawler: Option<CrawlerSettings>,
    fallback: Option<FallbackSettings>,
    pipeline: Option<PipelineSettings>,
    persona: Option<PersonaRef>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersonaRef {
    file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            api_key: None,
            log_level: None,
            log_format: "pretty".to_string(),
            verbose: false,
            no_color: false,
            persona_file: None,
            gemini: GeminiSettings::default(),
            crawler: CrawlerSettings::default(),
            fallback: FallbackSettings::default(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config file and environment.
    ///
    /// Environment variables:
    /// - `LUMINA_WORKSPACE`: Override workspace path
    /// - `LUMINA_CONFIG`: Path to config file
    /// - `LUMINA_MODEL`: Model identifier
    /// - `GEMINI_API_KEY` / `LUMINA_API_KEY`: Provider API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use lumina_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.gemini.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("LUMINA_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("LUMINA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config.config_path();
        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(model) = std::env::var("LUMINA_MODEL") {
            config.gemini.model = model;
        }

        config.api_key = read_non_empty(API_KEY_ENV).or_else(|| read_non_empty("LUMINA_API_KEY"));

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    fn config_path(&self) -> PathBuf {
        match self.config_file {
            Some(ref cf) => cf.clone(),
            None => self.lumina_dir().join("config.yaml"),
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(gemini) = config_file.gemini {
            result.gemini = gemini;
        }
        if let Some(crawler) = config_file.crawler {
            result.crawler = crawler;
        }
        if let Some(fallback) = config_file.fallback {
            result.fallback = fallback;
        }
        if let Some(pipeline) = config_file.pipeline {
            result.pipeline = pipeline;
        }

        if let Some(file) = config_file.persona.and_then(|p| p.file) {
            let persona_path = PathBuf::from(file);
            result.persona_file = Some(if persona_path.is_relative() {
                result.workspace.join(persona_path)
            } else {
                persona_path
            });
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment and file values.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(model) = model {
            self.gemini.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .lumina directory.
    pub fn lumina_dir(&self) -> PathBuf {
        self.workspace.join(".lumina")
    }

    /// Resolve the persona file: explicit setting first, then `.lumina/persona.yaml`.
    pub fn persona_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.persona_file {
            return Some(path.clone());
        }
        let default = self.lumina_dir().join("persona.yaml");
        default.exists().then_some(default)
    }

    /// Return the provider API key or a `MissingCredential` error.
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::MissingCredential(format!("{} is not configured", API_KEY_ENV))
            })
    }

    /// Validate numeric settings and endpoints.
    pub fn validate(&self) -> AppResult<()> {
        if self.gemini.model.trim().is_empty() {
            return Err(AppError::Config("Model identifier cannot be empty".to_string()));
        }

        if self.crawler.max_chars == 0 {
            return Err(AppError::Config(
                "crawler.maxChars must be greater than zero".to_string(),
            ));
        }

        if self.fallback.top_n == 0 {
            return Err(AppError::Config(
                "fallback.topN must be greater than zero".to_string(),
            ));
        }

        let timeouts = [
            ("gemini.timeoutSecs", self.gemini.timeout_secs),
            ("crawler.timeoutSecs", self.crawler.timeout_secs),
            ("fallback.timeoutSecs", self.fallback.timeout_secs),
            ("pipeline.deadlineSecs", self.pipeline.deadline_secs),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(AppError::Config(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        let endpoints = [
            ("gemini.endpoint", &self.gemini.endpoint),
            ("fallback.wikipediaApi", &self.fallback.wikipedia_api),
            ("fallback.wikipediaRest", &self.fallback.wikipedia_rest),
            ("fallback.duckduckgoApi", &self.fallback.duckduckgo_api),
        ];
        for (name, value) in endpoints {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

fn read_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
