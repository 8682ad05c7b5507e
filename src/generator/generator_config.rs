use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{LogLevel, Mode};
use crate::parser::{FlowPolicy, ParsePolicy};
use crate::synthesizer::templates::{HEALTH_CHECK_URL, category_keys};
use crate::synthesizer::{SynthesizerOptions, is_known_category};

use super::helpers::{default_user_agent, expand_tilde, fetch_text, is_remote};

/// Public list of VLESS REALITY/TCP links
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/x45fh56/tgs/refs/heads/main/Servers/Protocols/Categorized_Servers/1_VLESS_REALITY_TCP.txt";

// ============================================================================
// Generator Config Types
// ============================================================================

/// Generator configuration parsed from TOML file. Every key is optional.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Link list URL or local path
    #[serde(default = "default_source")]
    pub source: String,

    /// Output file path, default "./files/stash.yaml"
    #[serde(default = "default_output")]
    pub output: String,

    /// Source download timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Reject links whose security is not `reality`
    #[serde(default = "default_true")]
    pub require_reality: bool,

    /// What to do with links carrying an unknown `flow`
    #[serde(default)]
    pub flow_policy: FlowPolicy,

    /// Probe URL for url-test/fallback groups
    #[serde(default = "default_health_check_url")]
    pub health_check_url: String,

    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Category groups to emit (e.g., ["telegram", "youtube"]).
    /// If empty or not specified, every category is emitted.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
            fetch_timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
            require_reality: true,
            flow_policy: FlowPolicy::default(),
            health_check_url: default_health_check_url(),
            mode: Mode::default(),
            log_level: LogLevel::default(),
            categories: Vec::new(),
        }
    }
}

// ============================================================================
// Generator Config Implementation
// ============================================================================

impl GeneratorConfig {
    /// Parse generator config from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GeneratorConfig =
            toml::from_str(content).context("Failed to parse generator config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout == 0 {
            anyhow::bail!("fetch_timeout must be greater than 0");
        }

        if let Some(unknown) = self.categories.iter().find(|c| !is_known_category(c)) {
            anyhow::bail!(
                "Unknown category '{}', expected one of: {}",
                unknown,
                category_keys()
            );
        }

        let url = url::Url::parse(&self.health_check_url)
            .with_context(|| format!("Invalid health_check_url: {}", self.health_check_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!(
                "health_check_url must be an http(s) URL: {}",
                self.health_check_url
            );
        }

        Ok(())
    }

    /// Load generator config from file path
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read generator config from {:?}", path))?;
        Self::from_toml(&content)
    }

    /// Load generator config from file path or URL
    pub async fn load(path_or_url: &str) -> Result<Self> {
        if is_remote(path_or_url) {
            Self::from_url(path_or_url).await
        } else {
            // Expand ~ to home directory
            let expanded = expand_tilde(path_or_url);
            Self::from_file(Path::new(&expanded)).await
        }
    }

    /// Load generator config from URL
    pub async fn from_url(url: &str) -> Result<Self> {
        let timeout = Duration::from_secs(default_fetch_timeout());
        let content = fetch_text(url, &default_user_agent(), timeout)
            .await
            .with_context(|| format!("Failed to load generator config from {}", url))?;
        Self::from_toml(&content)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn parse_policy(&self) -> ParsePolicy {
        ParsePolicy {
            require_reality: self.require_reality,
            flow_policy: self.flow_policy,
        }
    }

    pub fn synthesizer_options(&self) -> SynthesizerOptions {
        SynthesizerOptions {
            health_check_url: self.health_check_url.clone(),
            mode: self.mode,
            log_level: self.log_level,
            categories: self.categories.clone(),
        }
    }
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_output() -> String {
    "./files/stash.yaml".to_string()
}

fn default_fetch_timeout() -> u64 {
    20
}

fn default_true() -> bool {
    true
}

fn default_health_check_url() -> String {
    HEALTH_CHECK_URL.to_string()
}
