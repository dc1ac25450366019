//! Configuration management for Threadcast

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::service::retry::RetryPolicy;
use crate::types::Tier;

/// Default per-segment budget for standard accounts
pub const STANDARD_BUDGET: usize = 280;

/// Default per-segment budget for extended accounts
pub const EXTENDED_BUDGET: usize = 25_000;

/// Default reading speed used for the read time estimate
pub const WORDS_PER_MINUTE: u32 = 200;

/// Default pause between two consecutive segment publishes
pub const INTER_POST_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub composer: ComposerConfig,
    pub posting: PostingConfig,
    pub mastodon: Option<MastodonConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub standard_budget: usize,
    pub extended_budget: usize,
    pub words_per_minute: u32,
    /// Append " (N/M)" to segments of multi-segment threads when it fits
    pub segment_indicators: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            standard_budget: STANDARD_BUDGET,
            extended_budget: EXTENDED_BUDGET,
            words_per_minute: WORDS_PER_MINUTE,
            segment_indicators: true,
        }
    }
}

impl ComposerConfig {
    /// Per-segment length budget, in characters, for the given tier
    pub fn budget_for(&self, tier: Tier) -> usize {
        match tier {
            Tier::Standard => self.standard_budget,
            Tier::Extended => self.extended_budget,
        }
    }

    /// Tier for an account whose platform accepts posts of up to `limit`
    /// characters: `Extended` once the extended budget fits.
    pub fn tier_for_limit(&self, limit: usize) -> Tier {
        if limit >= self.extended_budget {
            Tier::Extended
        } else {
            Tier::Standard
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.standard_budget == 0 {
            return Err(invalid("composer.standard_budget", "must be greater than zero"));
        }
        if self.extended_budget < self.standard_budget {
            return Err(invalid(
                "composer.extended_budget",
                "must not be smaller than composer.standard_budget",
            ));
        }
        if self.words_per_minute == 0 {
            return Err(invalid("composer.words_per_minute", "must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingConfig {
    #[serde(with = "duration_str")]
    pub inter_post_delay: Duration,
    /// Text appended to segments that reply to an earlier one; `None` disables it
    pub continuation_marker: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            inter_post_delay: INTER_POST_DELAY,
            continuation_marker: Some("(cont.)".to_string()),
            retry: RetryPolicy::default(),
        }
    }
}

impl PostingConfig {
    pub fn validate(&self) -> Result<()> {
        if let RetryPolicy::Bounded { max_attempts, .. } = self.retry {
            if max_attempts == 0 {
                return Err(invalid("posting.retry.max_attempts", "must be at least 1"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MastodonConfig {
    pub instance: String,
    pub token_file: String,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// A missing file is not an error; built-in defaults are used instead.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.composer.validate()?;
        self.posting.validate()?;
        if let Some(mastodon) = &self.mastodon {
            if mastodon.instance.trim().is_empty() {
                return Err(ConfigError::MissingField("mastodon.instance".to_string()).into());
            }
            if mastodon.token_file.trim().is_empty() {
                return Err(ConfigError::MissingField("mastodon.token_file".to_string()).into());
            }
        }
        Ok(())
    }
}

/// Resolve the configuration file path: `THREADCAST_CONFIG`, else the user config dir
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("THREADCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("threadcast").join("config.toml"))
}

fn invalid(field: &str, reason: &str) -> crate::error::ThreadcastError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Serde adapter for human readable durations such as "2s" or "500ms"
pub(crate) mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
