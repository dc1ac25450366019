//! Mock platform client for testing
//!
//! A scriptable [`PlatformClient`] that can simulate successes, failures,
//! malformed responses, panics and latency, and records every call it
//! receives. Used by the integration tests and by `thread-post --dry-run`.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::PlatformClient;

/// What the mock does for one publish call
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Publish and return a fresh id
    Success,
    /// Return the given error
    Fail(PlatformError),
    /// Return `Ok` with an empty id
    Malformed,
    /// Panic inside the client future
    Panic,
}

/// A publish call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCall {
    pub text: String,
    pub reply_to: Option<String>,
    /// Id handed back to the caller, if the call succeeded
    pub remote_id: Option<String>,
}

/// Configuration for mock client behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock", "mock-mastodon")
    pub name: String,

    /// Per-call responses, consumed in order
    pub script: Arc<Mutex<VecDeque<MockResponse>>>,

    /// Response once the script is exhausted
    pub fallback: MockResponse,

    /// Delay before completing each call (simulates network latency)
    pub delay: Duration,

    /// Reported character limit
    pub character_limit: Option<usize>,

    /// Calls that have been made (for verification)
    pub calls: Arc<Mutex<Vec<PublishCall>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: MockResponse::Success,
            delay: Duration::ZERO,
            character_limit: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform client for testing
#[derive(Debug, Clone)]
pub struct MockClient {
    config: MockConfig,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockClient {
    /// Create a new mock client with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock client where every call succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock client where every call fails with `error`
    pub fn failing(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            fallback: MockResponse::Fail(error),
            ..Default::default()
        })
    }

    /// Create a mock client that plays `responses` in order, then succeeds
    pub fn scripted(name: &str, responses: Vec<MockResponse>) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            script: Arc::new(Mutex::new(responses.into())),
            ..Default::default()
        })
    }

    /// Create a mock client with a delay on every call
    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    /// Create a mock client that reports a character limit
    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            character_limit: Some(limit),
            ..Default::default()
        })
    }

    /// Get the number of times publish was called
    pub fn call_count(&self) -> usize {
        locked(&self.config.calls).len()
    }

    /// Get all calls in the order they were made
    pub fn calls(&self) -> Vec<PublishCall> {
        locked(&self.config.calls).clone()
    }

    /// Get the text of every successfully published call
    pub fn published(&self) -> Vec<String> {
        locked(&self.config.calls)
            .iter()
            .filter(|c| c.remote_id.is_some())
            .map(|c| c.text.clone())
            .collect()
    }

    fn next_response(&self) -> MockResponse {
        locked(&self.config.script)
            .pop_front()
            .unwrap_or_else(|| self.config.fallback.clone())
    }
}

#[async_trait]
impl PlatformClient for MockClient {
    async fn publish(&self, text: &str, reply_to: Option<&str>) -> Result<String> {
        let response = self.next_response();

        // Simulate delay
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        let remote_id = matches!(response, MockResponse::Success)
            .then(|| format!("{}:mock-{}", self.config.name, self.call_count() + 1));

        locked(&self.config.calls).push(PublishCall {
            text: text.to_string(),
            reply_to: reply_to.map(str::to_string),
            remote_id: remote_id.clone(),
        });

        match response {
            MockResponse::Success => Ok(remote_id.unwrap_or_default()),
            MockResponse::Fail(error) => Err(error.into()),
            MockResponse::Malformed => Ok(String::new()),
            MockResponse::Panic => panic!("mock client {} panicked", self.config.name),
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }
}
