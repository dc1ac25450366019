//! Thread Composer
//!
//! Turns raw long-form content into an ordered list of budget-bounded
//! segments. Composition is pure: no I/O, no randomness, and the same
//! `(content, title, tier)` always yields byte-identical output.
//!
//! # Example
//!
//! ```
//! use libthreadcast::composer::{ComposeRequest, ThreadComposer};
//! use libthreadcast::types::{Strategy, Tier};
//!
//! let composer = ThreadComposer::default();
//! let thread = composer
//!     .compose(ComposeRequest {
//!         id: "thread-1".into(),
//!         content: "Short enough for one post.".to_string(),
//!         title: None,
//!         tier: Tier::Standard,
//!     })
//!     .unwrap();
//!
//! assert_eq!(thread.strategy, Strategy::SingleLongPost);
//! assert_eq!(thread.segments.len(), 1);
//! ```

pub mod pack;
pub mod tokens;

use tracing::{debug, warn};

use crate::config::ComposerConfig;
use crate::error::{Result, ThreadcastError};
use crate::types::{Segment, Strategy, Thread, ThreadId, ThreadStatus, Tier};

/// Input to [`ThreadComposer::compose`]
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub id: ThreadId,
    pub content: String,
    pub title: Option<String>,
    pub tier: Tier,
}

/// Composer bound to a set of per-tier budgets
#[derive(Debug, Clone, Default)]
pub struct ThreadComposer {
    config: ComposerConfig,
}

impl ThreadComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose a draft thread.
    ///
    /// # Errors
    ///
    /// Returns `ThreadcastError::EmptyContent` if the content is empty or
    /// whitespace only.
    pub fn compose(&self, request: ComposeRequest) -> Result<Thread> {
        compose(
            request.id,
            &request.content,
            request.title,
            request.tier,
            &self.config,
        )
    }
}

/// Compose `content` into a draft [`Thread`] for the given tier.
pub fn compose(
    id: ThreadId,
    content: &str,
    title: Option<String>,
    tier: Tier,
    config: &ComposerConfig,
) -> Result<Thread> {
    if content.trim().is_empty() {
        return Err(ThreadcastError::EmptyContent);
    }

    let budget = config.budget_for(tier);
    let paragraphs = tokens::paragraphs(content);
    let tokenized: Vec<Vec<tokens::Token<'_>>> =
        paragraphs.iter().map(|p| tokens::tokenize(p)).collect();
    let word_count: usize = tokenized.iter().map(Vec::len).sum();

    let packed = pack::pack(&tokenized, budget);
    let total = packed.segments.len();
    let strategy = if total == 1 {
        Strategy::SingleLongPost
    } else {
        Strategy::MultiSegmentThread
    };

    let segments: Vec<Segment> = packed
        .segments
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let order = i + 1;
            let text = if strategy == Strategy::MultiSegmentThread && config.segment_indicators {
                with_indicator(text, order, total, budget)
            } else {
                text
            };
            Segment::new(order, text)
        })
        .collect();

    if !packed.truncated.is_empty() {
        warn!(
            thread_id = %id,
            count = packed.truncated.len(),
            "Force-split {} token(s) longer than the {} character budget",
            packed.truncated.len(),
            budget
        );
    }

    debug!(
        thread_id = %id,
        %tier,
        %strategy,
        segments = segments.len(),
        words = word_count,
        "Composed thread"
    );

    Ok(Thread {
        id,
        title: title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        segments,
        tier,
        strategy,
        status: ThreadStatus::Draft,
        estimated_read_minutes: estimate_read_minutes(word_count, config.words_per_minute),
        truncated_tokens: packed.truncated,
    })
}

/// Positional indicator appended to segments of a multi-segment thread
pub fn indicator(order: usize, total: usize) -> String {
    format!(" ({}/{})", order, total)
}

/// Append the positional indicator if the result stays within `budget`.
fn with_indicator(mut text: String, order: usize, total: usize, budget: usize) -> String {
    let indicator = indicator(order, total);
    if text.chars().count() + indicator.chars().count() <= budget {
        text.push_str(&indicator);
    }
    text
}

/// Whole minutes needed to read `word_count` words, never less than one.
pub fn estimate_read_minutes(word_count: usize, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    let minutes = word_count.div_ceil(wpm).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
