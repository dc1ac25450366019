//! Platform client abstraction and implementations
//!
//! The posting orchestrator talks to a social platform exclusively through
//! the [`PlatformClient`] trait: publish one segment, optionally as a reply to
//! an earlier post, and get back the platform's id for it.
//!
//! # Examples
//!
//! ```no_run
//! use libthreadcast::platforms::{PlatformClient, mastodon::MastodonClient};
//! use libthreadcast::config::MastodonConfig;
//!
//! # async fn example() -> libthreadcast::error::Result<()> {
//! let config = MastodonConfig {
//!     instance: "https://mastodon.social".to_string(),
//!     token_file: "~/.config/threadcast/mastodon.token".to_string(),
//! };
//!
//! let client = MastodonClient::from_config(&config)?;
//!
//! let root = client.publish("First segment", None).await?;
//! let reply = client.publish("Second segment", Some(&root)).await?;
//! println!("Posted {} -> {}", root, reply);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{ConfigError, Result};

pub mod mastodon;

// Mock client is available for all builds (not just tests) to support
// integration tests and dry runs
pub mod mock;

/// Unified interface for publishing a single segment to a platform
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Publish `text`, as a reply to `reply_to` when given, or as a new
    /// top-level post otherwise.
    ///
    /// # Returns
    ///
    /// The platform-specific id of the new post, used as `reply_to` for the
    /// next segment.
    ///
    /// # Errors
    ///
    /// Returns a `PlatformError` (wrapped in `ThreadcastError::Platform`) if
    /// the platform rejects the post or cannot be reached.
    async fn publish(&self, text: &str, reply_to: Option<&str>) -> Result<String>;

    /// Lowercase platform identifier (e.g., "mastodon", "mock")
    fn name(&self) -> &str;

    /// Maximum characters per post, or `None` if the client does not know
    fn character_limit(&self) -> Option<usize> {
        None
    }
}

/// Create the platform client described by the configuration
///
/// # Errors
///
/// Returns `ConfigError::MissingField` if no platform is configured, or the
/// client's own construction error.
pub fn create_client(config: &Config) -> Result<Box<dyn PlatformClient>> {
    match &config.mastodon {
        Some(mastodon_config) => {
            let client = mastodon::MastodonClient::from_config(mastodon_config)?;
            Ok(Box::new(client))
        }
        None => Err(ConfigError::MissingField("mastodon".to_string()).into()),
    }
}
