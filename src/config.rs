//! Configuration for upstream API access

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_GEMINI_API: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Main configuration, built once at startup and shared by reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// GitHub access
    pub network: NetworkConfig,
    /// Text-generation access
    pub ai: AiConfig,
}

/// Network configuration for GitHub API calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Base URL of the GitHub REST API
    pub github_api_base: String,
    /// GitHub API token (optional, requests go out unauthenticated without it)
    pub github_token: Option<String>,
}

/// Configuration for the text-generation API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL of the Gemini API
    pub api_base: String,
    /// Model used for generateContent
    pub model: String,
    /// Gemini API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            github_api_base: DEFAULT_GITHUB_API.to_string(),
            github_token: std::env::var("GITHUB_TOKEN").ok(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GEMINI_API.to_string(),
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            timeout_secs: 120,
        }
    }
}

impl NetworkConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl InsightConfig {
    /// Create a new builder for InsightConfig
    pub fn builder() -> InsightConfigBuilder {
        InsightConfigBuilder::default()
    }

    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Builder for InsightConfig
#[derive(Default)]
pub struct InsightConfigBuilder {
    network: Option<NetworkConfig>,
    ai: Option<AiConfig>,
}

impl InsightConfigBuilder {
    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    pub fn ai(mut self, ai: AiConfig) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn build(self) -> InsightConfig {
        InsightConfig {
            network: self.network.unwrap_or_default(),
            ai: self.ai.unwrap_or_default(),
        }
    }
}
