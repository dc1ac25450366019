//! Posting tier resolution
//!
//! The composer needs to know which budget applies before it runs, but how
//! the tier is found out is up to the caller: a flag cached next to the
//! stored credential, a fixed value, or a question to the platform.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::ComposerConfig;
use crate::error::Result;
use crate::types::Tier;

/// Resolves the posting tier of the publishing account
#[async_trait]
pub trait TierResolver: Send + Sync {
    async fn resolve_tier(&self, budgets: &ComposerConfig) -> Result<Tier>;
}

/// Stored access credential for the publishing account.
///
/// The token is kept in a `SecretString` so it is zeroed on drop and never
/// shows up in `Debug` output.
#[derive(Debug)]
pub struct AccessCredential {
    token: SecretString,
    tier: Option<Tier>,
}

impl AccessCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            tier: None,
        }
    }

    /// Attach the tier recorded alongside the credential
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn tier_hint(&self) -> Option<Tier> {
        self.tier
    }
}

impl Clone for AccessCredential {
    fn clone(&self) -> Self {
        Self {
            token: SecretString::from(self.token.expose_secret().to_string()),
            tier: self.tier,
        }
    }
}

impl Tier {
    /// Tier implied by an optional credential: its recorded tier if any,
    /// `Standard` otherwise.
    pub fn from_credential(credential: Option<&AccessCredential>) -> Tier {
        credential
            .and_then(AccessCredential::tier_hint)
            .unwrap_or(Tier::Standard)
    }
}

/// Always resolves to the same tier
#[derive(Debug, Clone, Copy)]
pub struct StaticTierResolver(pub Tier);

#[async_trait]
impl TierResolver for StaticTierResolver {
    async fn resolve_tier(&self, _budgets: &ComposerConfig) -> Result<Tier> {
        Ok(self.0)
    }
}

/// Resolves from the tier recorded with a stored credential
#[derive(Debug, Clone, Default)]
pub struct CredentialTierResolver {
    credential: Option<AccessCredential>,
}

impl CredentialTierResolver {
    pub fn new(credential: Option<AccessCredential>) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl TierResolver for CredentialTierResolver {
    async fn resolve_tier(&self, _budgets: &ComposerConfig) -> Result<Tier> {
        Ok(Tier::from_credential(self.credential.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_credential() {
        assert_eq!(Tier::from_credential(None), Tier::Standard);

        let plain = AccessCredential::new("token");
        assert_eq!(Tier::from_credential(Some(&plain)), Tier::Standard);

        let extended = AccessCredential::new("token").with_tier(Tier::Extended);
        assert_eq!(Tier::from_credential(Some(&extended)), Tier::Extended);
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let credential = AccessCredential::new("super-secret-token");
        let debug = format!("{:?}", credential);

        assert!(!debug.contains("super-secret-token"));
        assert_eq!(credential.token(), "super-secret-token");
        assert_eq!(credential.clone().token(), "super-secret-token");
    }

    #[tokio::test]
    async fn test_resolvers() {
        let budgets = ComposerConfig::default();

        assert_eq!(
            StaticTierResolver(Tier::Extended)
                .resolve_tier(&budgets)
                .await
                .unwrap(),
            Tier::Extended
        );

        let resolver = CredentialTierResolver::new(Some(
            AccessCredential::new("token").with_tier(Tier::Extended),
        ));
        assert_eq!(resolver.resolve_tier(&budgets).await.unwrap(), Tier::Extended);

        let resolver = CredentialTierResolver::default();
        assert_eq!(resolver.resolve_tier(&budgets).await.unwrap(), Tier::Standard);
    }
}
