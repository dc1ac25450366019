//! Mastodon platform client
//!
//! Publishes segments as statuses through the megalodon library, chaining
//! replies with `in_reply_to_id`. Works with Mastodon and the Fediverse
//! servers that implement its API (Pleroma, Akkoma, GoToSocial, ...).

use async_trait::async_trait;
use megalodon::megalodon::{PostStatusInputOptions, PostStatusOutput};
use megalodon::{Megalodon, SNS};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::config::{ComposerConfig, MastodonConfig};
use crate::error::{PlatformError, Result};
use crate::platforms::PlatformClient;
use crate::tier::TierResolver;
use crate::types::Tier;

/// Default status length until the instance reports its own
const DEFAULT_CHARACTER_LIMIT: usize = 500;

/// Mastodon platform client
pub struct MastodonClient {
    client: Box<dyn Megalodon + Send + Sync>,

    /// The instance URL (e.g., "https://mastodon.social")
    instance_url: String,

    /// Character limit for statuses (instance-specific)
    character_limit: usize,
}

impl MastodonClient {
    /// Create a new Mastodon client
    ///
    /// Starts with the default 500 character limit; call
    /// [`fetch_instance_info`](Self::fetch_instance_info) to learn the
    /// instance's actual limit.
    pub fn new(instance_url: String, access_token: SecretString) -> Result<Self> {
        let instance_url = normalize_instance_url(&instance_url);
        let client = megalodon::generator(
            SNS::Mastodon,
            instance_url.clone(),
            Some(access_token.expose_secret().to_string()),
            None,
        )
        .map_err(|e| {
            PlatformError::Authentication(format!("Failed to create Mastodon client: {:?}", e))
        })?;

        Ok(Self {
            client,
            instance_url,
            character_limit: DEFAULT_CHARACTER_LIMIT,
        })
    }

    /// Create a Mastodon client from configuration, reading the access token
    /// from the configured token file.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if the token file cannot be
    /// read or is empty.
    pub fn from_config(config: &MastodonConfig) -> Result<Self> {
        let token_path = shellexpand::full(&config.token_file).map_err(|e| {
            PlatformError::Authentication(format!("Failed to expand token file path: {}", e))
        })?;

        let token = std::fs::read_to_string(token_path.as_ref()).map_err(|e| {
            PlatformError::Authentication(format!("Failed to read Mastodon token file: {}", e))
        })?;
        let token = token.trim();

        if token.is_empty() {
            return Err(
                PlatformError::Authentication("Mastodon token file is empty".to_string()).into(),
            );
        }

        Self::new(config.instance.clone(), SecretString::from(token.to_string()))
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Query the instance for its maximum status length and remember it.
    pub async fn fetch_instance_info(&mut self) -> Result<usize> {
        let response = self
            .client
            .get_instance()
            .await
            .map_err(|e| map_megalodon_error(e, "fetch instance info"))?;

        let limit = response.json.configuration.statuses.max_characters as usize;
        debug!(instance = %self.instance_url, limit, "Fetched instance character limit");
        self.character_limit = limit;

        Ok(limit)
    }

    fn validate(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        let char_count = text.chars().count();
        if char_count > self.character_limit {
            return Err(PlatformError::Validation(format!(
                "Content exceeds Mastodon's {} character limit (current: {} characters)",
                self.character_limit, char_count
            ))
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl PlatformClient for MastodonClient {
    async fn publish(&self, text: &str, reply_to: Option<&str>) -> Result<String> {
        self.validate(text)?;

        let options = PostStatusInputOptions {
            in_reply_to_id: reply_to.map(str::to_string),
            ..Default::default()
        };

        let response = self
            .client
            .post_status(text.to_string(), Some(&options))
            .await
            .map_err(|e| map_megalodon_error(e, "post status"))?;

        let id = match response.json {
            PostStatusOutput::Status(status) => status.id,
            PostStatusOutput::ScheduledStatus(_) => {
                return Err(PlatformError::MalformedResponse(
                    "Mastodon returned a scheduled status instead of a published one".to_string(),
                )
                .into())
            }
        };

        Ok(id)
    }

    fn name(&self) -> &str {
        "mastodon"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(self.character_limit)
    }
}

#[async_trait]
impl TierResolver for MastodonClient {
    /// Extended when the instance accepts statuses at least as long as the
    /// extended budget.
    async fn resolve_tier(&self, budgets: &ComposerConfig) -> Result<Tier> {
        let response = self
            .client
            .get_instance()
            .await
            .map_err(|e| map_megalodon_error(e, "fetch instance info"))?;

        let limit = response.json.configuration.statuses.max_characters as usize;
        Ok(budgets.tier_for_limit(limit))
    }
}

fn normalize_instance_url(instance: &str) -> String {
    let instance = instance.trim().trim_end_matches('/');
    if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("https://{}", instance)
    }
}

/// Map megalodon errors to `PlatformError`
///
/// - HTTP 401/403 → `Authentication`
/// - HTTP 422 → `Validation`
/// - HTTP 429 → `RateLimit`
/// - HTTP 5xx and other HTTP codes → `Network`
/// - parse/deserialize failures → `MalformedResponse`
/// - anything else → classified by message, defaulting to `Network`
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> PlatformError {
    classify_error(&error.to_string(), context)
}

fn classify_error(message: &str, context: &str) -> PlatformError {
    let lower = message.to_lowercase();

    match extract_http_status(message) {
        Some(401) | Some(403) => PlatformError::Authentication(format!(
            "Mastodon authentication failed ({}): {}. \
             Suggestion: Verify your access token is valid and has not expired.",
            context, message
        )),
        Some(422) => PlatformError::Validation(format!(
            "Mastodon validation failed ({}): {}",
            context, message
        )),
        Some(429) => PlatformError::RateLimit(format!(
            "Mastodon rate limit exceeded ({}): {}",
            context, message
        )),
        Some(500..=599) => PlatformError::Network(format!(
            "Mastodon server error ({}): {}",
            context, message
        )),
        Some(_) => PlatformError::Network(format!("Mastodon HTTP error ({}): {}", context, message)),
        None if lower.contains("unauthorized") || lower.contains("forbidden") => {
            PlatformError::Authentication(format!(
                "Mastodon authentication failed ({}): {}",
                context, message
            ))
        }
        None if lower.contains("parse") || lower.contains("json") || lower.contains("deserialize") => {
            PlatformError::MalformedResponse(format!(
                "Mastodon response parse error ({}): {}",
                context, message
            ))
        }
        None if lower.contains("rate limit") || lower.contains("too many requests") => {
            PlatformError::RateLimit(format!(
                "Mastodon rate limit exceeded ({}): {}",
                context, message
            ))
        }
        None => PlatformError::Network(format!(
            "Mastodon error ({}): {}. \
             Suggestion: Check your network connection and instance availability.",
            context, message
        )),
    }
}

/// Pull an HTTP status code out of an error message such as "HTTP 401",
/// "status 403" or "422: Unprocessable".
fn extract_http_status(message: &str) -> Option<u16> {
    let valid = |code: u16| (100..=599).contains(&code).then_some(code);

    for prefix in ["HTTP ", "status ", "status_code: ", "code: "] {
        if let Some(pos) = message.find(prefix) {
            let code = message[pos + prefix.len()..]
                .get(0..3)
                .and_then(|s| s.parse::<u16>().ok())
                .and_then(valid);
            if code.is_some() {
                return code;
            }
        }
    }

    let bytes = message.as_bytes();
    bytes.windows(4).enumerate().find_map(|(i, w)| {
        let standalone = i == 0 || !bytes[i - 1].is_ascii_digit();
        let digits = w[..3].iter().all(u8::is_ascii_digit);
        if standalone && digits && (w[3] == b':' || w[3] == b' ') {
            std::str::from_utf8(&w[..3])
                .ok()
                .and_then(|s| s.parse::<u16>().ok())
                .and_then(valid)
        } else {
            None
        }
    })
}
