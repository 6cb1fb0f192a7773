//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The WebDriver endpoint may be overridden by the env var named in
//! `browser.webdriver_url_env`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::types::Target;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub watcher: WatcherConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatcherConfig {
    pub name: String,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_profile_base_url")]
    pub profile_base_url: String,
    pub accounts: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Name of an env var that, when set, replaces `webdriver_url`.
    #[serde(default)]
    pub webdriver_url_env: Option<String>,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_sixty")]
    pub navigation_timeout_secs: u64,
    #[serde(default = "default_sixty")]
    pub scroll_budget_secs: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_post_selector")]
    pub post_selector: String,
}

fn default_sweep_interval_secs() -> u64 {
    15 * 60
}

fn default_profile_base_url() -> String {
    "https://twitter.com".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sixty() -> u64 {
    60
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_post_selector() -> String {
    "article".to_string()
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            webdriver_url_env: None,
            headless: true,
            navigation_timeout_secs: default_sixty(),
            scroll_budget_secs: default_sixty(),
            settle_ms: default_settle_ms(),
            post_selector: default_post_selector(),
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.watcher.accounts.is_empty() {
            bail!("watcher.accounts must list at least one account");
        }
        if let Some(blank) = self.watcher.accounts.iter().position(|a| a.trim().is_empty()) {
            bail!("watcher.accounts[{blank}] is blank");
        }
        if self.watcher.sweep_interval_secs == 0 {
            bail!("watcher.sweep_interval_secs must be > 0");
        }
        if self.browser.navigation_timeout_secs == 0 {
            bail!("browser.navigation_timeout_secs must be > 0");
        }
        if self.browser.scroll_budget_secs == 0 {
            bail!("browser.scroll_budget_secs must be > 0");
        }
        if self.browser.settle_ms == 0 {
            bail!("browser.settle_ms must be > 0");
        }
        Ok(())
    }

    /// Targets in configured scan order.
    pub fn targets(&self) -> Vec<Target> {
        self.watcher
            .accounts
            .iter()
            .map(|a| Target::new(a.trim()))
            .collect()
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.watcher.sweep_interval_secs)
    }

    /// WebDriver endpoint, honouring the env override if set.
    pub fn webdriver_url(&self) -> String {
        self.browser
            .webdriver_url_env
            .as_deref()
            .and_then(|env| std::env::var(env).ok())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.browser.webdriver_url.clone())
    }
}
