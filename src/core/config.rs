//! Bot configuration loaded from `karmabot.toml`.
//!
//! An absent file is not an error: every field has a default.

use crate::core::error::KarmaError;
use crate::core::schemas;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "karmabot.toml";
pub const DB_PATH_ENV: &str = "KARMABOT_DB";

pub const DEFAULT_FRESHNESS_THRESHOLD_SECS: u64 = 30;
pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;

/// Deflections used when someone tries to karma themselves and no pool is configured.
pub const DEFAULT_SELF_KARMA_REPLIES: &[&str] = &[
    "Nice try.",
    "Self-love is important, but not here.",
    "Karma doesn't work that way.",
    "I'm telling everyone you tried that.",
    "The karma gods are not amused.",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bot: BotConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BotConfig {
    /// Messages older than this are dropped unanswered. 0 disables the check.
    pub freshness_threshold_seconds: u64,
    pub leaderboard_size: usize,
    /// Empty means the built-in pool.
    pub self_karma_replies: Vec<String>,
    /// Fixes the self-karma reply sequence when set.
    pub rng_seed: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            freshness_threshold_seconds: DEFAULT_FRESHNESS_THRESHOLD_SECS,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            self_karma_replies: Vec::new(),
            rng_seed: None,
        }
    }
}

impl BotConfig {
    pub fn self_karma_pool(&self) -> Vec<String> {
        if self.self_karma_replies.is_empty() {
            DEFAULT_SELF_KARMA_REPLIES
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.self_karma_replies.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub audit_log: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(schemas::KARMA_DB_NAME),
            audit_log: false,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self, KarmaError> {
        toml::from_str(content).map_err(|e| KarmaError::ConfigError(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, KarmaError> {
        toml::to_string_pretty(self).map_err(|e| KarmaError::ConfigError(e.to_string()))
    }

    /// Apply `KARMABOT_DB` on top of the file settings.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(DB_PATH_ENV)
            && !path.trim().is_empty()
        {
            self.store.path = PathBuf::from(path);
        }
    }
}

/// Load config from `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config, KarmaError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path).map_err(KarmaError::IoError)?;
    Config::parse(&content)
}
