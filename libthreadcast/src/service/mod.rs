//! Service layer for Threadcast
//!
//! This module provides a single API that frontends (the `thread-post` CLI,
//! or a web backend handing over stored content and credentials) use to
//! compose and publish threads without wiring the pieces together themselves.
//!
//! # Architecture
//!
//! `ThreadcastService` is a facade over:
//!
//! - `ThreadComposer`: content to budget-bounded segments
//! - `ThreadPoster`: sequential reply-chain publishing
//! - `EventBus`: publish progress events
//!
//! # Example
//!
//! ```no_run
//! use libthreadcast::composer::ComposeRequest;
//! use libthreadcast::platforms::mock::MockClient;
//! use libthreadcast::service::ThreadcastService;
//! use libthreadcast::types::Tier;
//!
//! # async fn example() -> libthreadcast::Result<()> {
//! let service = ThreadcastService::new()?;
//!
//! let mut thread = service.compose(ComposeRequest {
//!     id: "thread-1".into(),
//!     content: "A long essay...".to_string(),
//!     title: Some("Essay".to_string()),
//!     tier: Tier::Standard,
//! })?;
//!
//! let client = MockClient::success("mock");
//! let report = service.publish(&mut thread, &client).await?;
//! println!("{}: {}/{} published", report.status, report.succeeded(), thread.len());
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod posting;
pub mod retry;

pub use events::{EventBus, EventReceiver, ThreadEvent};
pub use posting::{PublishReport, ThreadPoster};
pub use retry::RetryPolicy;

use crate::composer::{ComposeRequest, ThreadComposer};
use crate::platforms::PlatformClient;
use crate::tier::TierResolver;
use crate::types::{Thread, Tier};
use crate::{Config, Result};

/// Main service facade
///
/// The composer and poster share one configuration snapshot and one event
/// bus; the service itself holds no per-thread state and can be shared
/// across tasks.
///
/// # Example
///
/// ```
/// use libthreadcast::service::ThreadcastService;
/// use libthreadcast::Config;
///
/// let service = ThreadcastService::from_config(Config::default()).unwrap();
/// let _events = service.subscribe();
/// assert_eq!(service.composer().config().standard_budget, 280);
/// ```
pub struct ThreadcastService {
    composer: ThreadComposer,
    poster: ThreadPoster,
    event_bus: EventBus,
}

impl ThreadcastService {
    /// Create a service from the configuration at the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read,
    /// parsed, or validated.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config)
    }

    /// Create a service from an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(100);
        let composer = ThreadComposer::new(config.composer.clone());
        let poster = ThreadPoster::new(config.posting, config.composer, event_bus.clone());

        Ok(Self {
            composer,
            poster,
            event_bus,
        })
    }

    pub fn composer(&self) -> &ThreadComposer {
        &self.composer
    }

    pub fn poster(&self) -> &ThreadPoster {
        &self.poster
    }

    /// Compose content into a draft thread
    pub fn compose(&self, request: ComposeRequest) -> Result<Thread> {
        self.composer.compose(request)
    }

    /// Publish a draft thread through `client`
    pub async fn publish(
        &self,
        thread: &mut Thread,
        client: &dyn PlatformClient,
    ) -> Result<PublishReport> {
        self.poster.publish(thread, client).await
    }

    /// Ask `resolver` which tier applies, using this service's budgets
    pub async fn resolve_tier(&self, resolver: &dyn TierResolver) -> Result<Tier> {
        resolver.resolve_tier(self.composer.config()).await
    }

    /// Subscribe to publish progress events
    ///
    /// # Example
    ///
    /// ```no_run
    /// use libthreadcast::service::ThreadcastService;
    ///
    /// # async fn example() -> libthreadcast::Result<()> {
    /// let service = ThreadcastService::new()?;
    /// let mut events = service.subscribe();
    ///
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         println!("Event: {:?}", event);
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }
}
