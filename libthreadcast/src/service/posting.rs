//! Posting orchestrator for composed threads
//!
//! Publishes the segments of a draft thread one at a time, in order, each as
//! a reply to the last segment that was successfully published. A failed
//! segment is recorded and skipped; the loop always runs to the end and the
//! thread's final status is aggregated from the per-segment outcomes.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::events::{EventBus, ThreadEvent};
use crate::config::{ComposerConfig, PostingConfig};
use crate::error::{PlatformError, Result, ThreadcastError};
use crate::platforms::PlatformClient;
use crate::types::{PostingOutcome, Segment, Thread, ThreadId, ThreadStatus, Tier};

/// Sequential thread publisher
///
/// Holds no per-publish state; everything a publish builds lives in the
/// `Thread` it borrows mutably and in the returned report.
#[derive(Clone)]
pub struct ThreadPoster {
    config: PostingConfig,
    budgets: ComposerConfig,
    event_bus: EventBus,
}

/// Result of publishing one thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub thread_id: ThreadId,
    pub platform: String,
    pub status: ThreadStatus,
    /// One outcome per segment, in segment order
    pub outcomes: Vec<PostingOutcome>,
}

impl PublishReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Remote id of the first published segment, if any
    pub fn root_id(&self) -> Option<&str> {
        self.outcomes.iter().find_map(|o| o.remote_id.as_deref())
    }

    /// Remote ids of every published segment, in order
    pub fn remote_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| o.remote_id.as_deref())
            .collect()
    }
}

impl ThreadPoster {
    pub fn new(config: PostingConfig, budgets: ComposerConfig, event_bus: EventBus) -> Self {
        Self {
            config,
            budgets,
            event_bus,
        }
    }

    pub fn config(&self) -> &PostingConfig {
        &self.config
    }

    /// Publish every segment of a draft thread through `client`.
    ///
    /// Per-segment failures never abort the loop; they show up as failed
    /// outcomes and in the aggregated status. On return the thread holds its
    /// terminal status.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` without calling the client if the thread is
    /// not a draft.
    pub async fn publish(
        &self,
        thread: &mut Thread,
        client: &dyn PlatformClient,
    ) -> Result<PublishReport> {
        if thread.status != ThreadStatus::Draft {
            return Err(ThreadcastError::InvalidState {
                thread_id: thread.id.to_string(),
                status: thread.status,
            });
        }

        let platform = client.name().to_string();
        let total = thread.segments.len();
        let limit = self.marker_budget(thread.tier, client);

        info!(
            "Publishing thread {} to {} ({} segments)",
            thread.id, platform, total
        );
        self.event_bus.emit(ThreadEvent::PublishStarted {
            thread_id: thread.id.to_string(),
            platform: platform.clone(),
            segments: total,
        });

        let mut previous_remote_id: Option<String> = None;
        let mut outcomes = Vec::with_capacity(total);

        for (index, segment) in thread.segments.iter().enumerate() {
            let text = self.outgoing_text(segment, previous_remote_id.is_some(), limit);
            let outcome = self
                .publish_segment(client, segment.order, &text, previous_remote_id.as_deref())
                .await;

            match (&outcome.remote_id, &outcome.error) {
                (Some(remote_id), _) => {
                    debug!(
                        "Segment {}/{} of thread {} posted as {}",
                        segment.order, total, thread.id, remote_id
                    );
                    self.event_bus.emit(ThreadEvent::SegmentPosted {
                        thread_id: thread.id.to_string(),
                        order: segment.order,
                        remote_id: remote_id.clone(),
                        reply_to: previous_remote_id.clone(),
                    });
                    previous_remote_id = Some(remote_id.clone());
                }
                (None, error) => {
                    let error = error.clone().unwrap_or_default();
                    warn!(
                        "Segment {}/{} of thread {} failed: {}",
                        segment.order, total, thread.id, error
                    );
                    self.event_bus.emit(ThreadEvent::SegmentFailed {
                        thread_id: thread.id.to_string(),
                        order: segment.order,
                        error,
                    });
                }
            }

            outcomes.push(outcome);

            if index + 1 < total && !self.config.inter_post_delay.is_zero() {
                sleep(self.config.inter_post_delay).await;
            }
        }

        let status = ThreadStatus::from_outcomes(&outcomes);
        thread.finish(status)?;

        let report = PublishReport {
            thread_id: thread.id.clone(),
            platform,
            status,
            outcomes,
        };

        match status {
            ThreadStatus::Failed => error!(
                "Thread {} failed: none of {} segments were published",
                thread.id, total
            ),
            _ => info!(
                "Thread {} {}: {}/{} segments published",
                thread.id,
                status,
                report.succeeded(),
                total
            ),
        }
        self.event_bus.emit(ThreadEvent::PublishFinished {
            thread_id: thread.id.to_string(),
            status,
            succeeded: report.succeeded(),
            failed: report.failed(),
        });

        Ok(report)
    }

    /// Largest outgoing text that may be sent for `tier` through `client`
    fn marker_budget(&self, tier: Tier, client: &dyn PlatformClient) -> usize {
        let budget = self.budgets.budget_for(tier);
        client
            .character_limit()
            .map_or(budget, |limit| limit.min(budget))
    }

    /// Segment text plus the continuation marker when the segment is a
    /// reply and the marker still fits.
    fn outgoing_text(&self, segment: &Segment, is_reply: bool, limit: usize) -> String {
        match self.config.continuation_marker.as_deref() {
            Some(marker) if is_reply && !marker.is_empty() => {
                let marked = format!("{} {}", segment.text, marker);
                if marked.chars().count() <= limit {
                    marked
                } else {
                    segment.text.clone()
                }
            }
            _ => segment.text.clone(),
        }
    }

    /// Publish one segment, retrying per the configured policy
    async fn publish_segment(
        &self,
        client: &dyn PlatformClient,
        order: usize,
        text: &str,
        reply_to: Option<&str>,
    ) -> PostingOutcome {
        let retry = self.config.retry;
        let mut attempt = 1;

        loop {
            match attempt_publish(client, text, reply_to).await {
                Ok(remote_id) => {
                    if attempt > 1 {
                        info!(
                            "Segment {} posted to {} on attempt {}",
                            order,
                            client.name(),
                            attempt
                        );
                    }
                    return PostingOutcome::posted(
                        order,
                        text.to_string(),
                        remote_id,
                        reply_to.map(str::to_string),
                        attempt,
                    );
                }
                Err(e) if retry.should_retry(&e, attempt) => {
                    let wait = retry.backoff(attempt);
                    warn!(
                        "Transient error posting segment {} to {} (attempt {}/{}): {}. Retrying in {:?}...",
                        order,
                        client.name(),
                        attempt,
                        retry.max_attempts(),
                        e,
                        wait
                    );
                    if !wait.is_zero() {
                        sleep(wait).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    return PostingOutcome::failed(
                        order,
                        text.to_string(),
                        e.to_string(),
                        reply_to.map(str::to_string),
                        attempt,
                    );
                }
            }
        }
    }
}

/// One client call, with panics and empty ids turned into errors
async fn attempt_publish(
    client: &dyn PlatformClient,
    text: &str,
    reply_to: Option<&str>,
) -> Result<String> {
    let remote_id = AssertUnwindSafe(client.publish(text, reply_to))
        .catch_unwind()
        .await
        .map_err(|panic| {
            error!("{} client panicked while publishing", client.name());
            PlatformError::Posting(format!(
                "{} client panicked: {}",
                client.name(),
                panic_message(&*panic)
            ))
        })??;

    if remote_id.trim().is_empty() {
        return Err(PlatformError::MalformedResponse(format!(
            "{} returned an empty post id",
            client.name()
        ))
        .into());
    }

    Ok(remote_id)
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
