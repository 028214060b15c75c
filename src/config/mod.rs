//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `PAPER_FORGE_*` environment variables (`__` separates nested keys, e.g.
//! `PAPER_FORGE_GENERATION__MODEL`). The Gemini key also falls back to
//! `GEMINI_API_KEY`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [generation]
//! api_key = "your-gemini-key"
//! model = "gemini-1.5-flash"
//! base_url = "https://generativelanguage.googleapis.com/v1beta"
//! timeout_seconds = 120
//!
//! [bibliography]
//! base_url = "https://api.crossref.org"
//! mailto = "you@example.org"
//! timeout_seconds = 30
//! context_results = 15
//! prompt_citations = 10
//! display_results = 10
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::citation::BibliographicLookup;
use crate::document::{Assembler, AssemblySettings};
use crate::generation::{GeminiGenerator, DEFAULT_MODEL, GEMINI_API_BASE};
use crate::sources::{CrossRefSource, CROSSREF_API_BASE};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PAPER_FORGE";

/// File looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "paper-forge.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub bibliography: BibliographyConfig,
    pub logging: LoggingConfig,
}

/// Generation backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Gemini API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Bibliographic backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibliographyConfig {
    pub base_url: String,
    /// Contact address for CrossRef's polite pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,
    pub timeout_seconds: u64,
    pub context_results: usize,
    pub prompt_citations: usize,
    pub display_results: usize,
}

impl Default for BibliographyConfig {
    fn default() -> Self {
        let settings = AssemblySettings::default();
        Self {
            base_url: CROSSREF_API_BASE.to_string(),
            mailto: None,
            timeout_seconds: 30,
            context_results: settings.context_results,
            prompt_citations: settings.prompt_citations,
            display_results: settings.display_results,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to initialize {0} client: {1}")]
    Backend(&'static str, String),
}

impl Config {
    /// Check values that would only fail later at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("generation.base_url", &self.generation.base_url),
            ("bibliography.base_url", &self.bibliography.base_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{} '{}': {}", name, value, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "{} must use http or https",
                    name
                )));
            }
        }

        for (name, value) in [
            ("bibliography.context_results", self.bibliography.context_results),
            ("bibliography.prompt_citations", self.bibliography.prompt_citations),
            ("bibliography.display_results", self.bibliography.display_results),
            ("generation.timeout_seconds", self.generation.timeout_seconds as usize),
            ("bibliography.timeout_seconds", self.bibliography.timeout_seconds as usize),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }

        if self.generation.model.trim().is_empty() {
            return Err(ConfigError::Invalid("generation.model is empty".to_string()));
        }

        Ok(())
    }

    /// Record counts for the assembler
    pub fn assembly_settings(&self) -> AssemblySettings {
        AssemblySettings {
            context_results: self.bibliography.context_results,
            prompt_citations: self.bibliography.prompt_citations,
            display_results: self.bibliography.display_results,
        }
    }

    /// CrossRef source built from `[bibliography]`
    pub fn crossref_source(&self) -> Result<CrossRefSource, ConfigError> {
        CrossRefSource::with_base_url(
            &self.bibliography.base_url,
            self.bibliography.mailto.clone(),
            Duration::from_secs(self.bibliography.timeout_seconds),
        )
        .map_err(|e| ConfigError::Backend("CrossRef", e.to_string()))
    }

    /// Gemini generator built from `[generation]`
    pub fn gemini_generator(&self) -> Result<GeminiGenerator, ConfigError> {
        GeminiGenerator::with_base_url(
            &self.generation.base_url,
            &self.generation.model,
            self.generation.api_key.clone(),
            Duration::from_secs(self.generation.timeout_seconds),
        )
        .map_err(|e| ConfigError::Backend("Gemini", e.to_string()))
    }

    /// Lookup over the configured CrossRef source
    pub fn lookup(&self) -> Result<BibliographicLookup, ConfigError> {
        Ok(BibliographicLookup::new(Arc::new(self.crossref_source()?)))
    }

    /// Assembler wired to the production backends
    pub fn assembler(&self) -> Result<Assembler, ConfigError> {
        Ok(
            Assembler::new(Arc::new(self.gemini_generator()?), self.lookup()?)
                .with_settings(self.assembly_settings()),
        )
    }

    /// Write the configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// `<config_dir>/paper-forge/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("paper-forge").join("config.toml"))
}

/// First existing file among `./paper-forge.toml` and the user config path
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|path| path.is_file())
}

/// Load configuration from an explicit file, or the first one found
///
/// An explicit path must exist; a discovered one is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            if let Some(found) = find_config_file() {
                tracing::debug!("Using configuration file {}", found.display());
                builder = builder.add_source(config::File::from(found).required(false));
            }
        }
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;

    if config.generation.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        config.generation.api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
    }

    Ok(config)
}
