//! Core types for Threadcast

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ThreadcastError};

/// Opaque thread identifier, assigned by whoever stores the thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Account capability class controlling the per-segment length budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Standard,
    Extended,
}

impl FromStr for Tier {
    type Err = ThreadcastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Tier::Standard),
            "extended" => Ok(Tier::Extended),
            _ => Err(ThreadcastError::InvalidInput(format!(
                "Invalid tier: '{}'. Valid options: standard, extended",
                s
            ))),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Standard => write!(f, "standard"),
            Tier::Extended => write!(f, "extended"),
        }
    }
}

/// How the composer laid the content out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    MultiSegmentThread,
    SingleLongPost,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::MultiSegmentThread => write!(f, "multi_segment_thread"),
            Strategy::SingleLongPost => write!(f, "single_long_post"),
        }
    }
}

/// Lifecycle status of a thread.
///
/// Only ever moves forward: `Draft` to one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Draft,
    Posted,
    Partial,
    Failed,
}

impl ThreadStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ThreadStatus::Draft)
    }

    /// Aggregate per-segment outcomes into a terminal status.
    ///
    /// An empty outcome list counts as `Failed`: nothing reached the platform.
    pub fn from_outcomes(outcomes: &[PostingOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();

        if succeeded == 0 {
            ThreadStatus::Failed
        } else if succeeded == outcomes.len() {
            ThreadStatus::Posted
        } else {
            ThreadStatus::Partial
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadStatus::Draft => write!(f, "draft"),
            ThreadStatus::Posted => write!(f, "posted"),
            ThreadStatus::Partial => write!(f, "partial"),
            ThreadStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One publishable unit of a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based position; defines posting and reply order
    pub order: usize,
    pub text: String,
    /// Length of `text` in Unicode scalar values
    pub char_count: usize,
}

impl Segment {
    pub fn new(order: usize, text: String) -> Self {
        let char_count = text.chars().count();
        Self {
            order,
            text,
            char_count,
        }
    }
}

/// Kind of an atomic token in the composer's token list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Word,
    Url,
}

/// A token longer than the budget that had to be split across segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncatedToken {
    pub kind: TokenKind,
    /// Length of the original token in characters
    pub char_count: usize,
    /// Order of the segment the token starts in
    pub first_segment: usize,
    /// Number of pieces the token was cut into
    pub pieces: usize,
}

/// The unit of work: an ordered list of segments plus composition metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub title: Option<String>,
    pub segments: Vec<Segment>,
    pub tier: Tier,
    pub strategy: Strategy,
    pub status: ThreadStatus,
    pub estimated_read_minutes: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub truncated_tokens: Vec<TruncatedToken>,
}

impl Thread {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Move a draft thread to a terminal status.
    ///
    /// Fails with `InvalidState` if the thread already left `Draft` or if
    /// `status` is `Draft` itself.
    pub fn finish(&mut self, status: ThreadStatus) -> Result<()> {
        if self.status.is_terminal() || !status.is_terminal() {
            return Err(ThreadcastError::InvalidState {
                thread_id: self.id.to_string(),
                status: self.status,
            });
        }
        self.status = status;
        Ok(())
    }
}

/// Result of attempting to publish one segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingOutcome {
    pub order: usize,
    pub success: bool,
    /// Text sent on the last attempt, continuation marker included
    pub text: String,
    /// Platform id of the published post; present iff `success`
    pub remote_id: Option<String>,
    /// Present iff `!success`
    pub error: Option<String>,
    /// Remote id this attempt replied to, if any
    pub reply_to: Option<String>,
    pub attempts: u32,
    /// Unix timestamp of the successful publish
    pub posted_at: Option<i64>,
}

impl PostingOutcome {
    pub fn posted(
        order: usize,
        text: String,
        remote_id: String,
        reply_to: Option<String>,
        attempts: u32,
    ) -> Self {
        Self {
            order,
            success: true,
            text,
            remote_id: Some(remote_id),
            error: None,
            reply_to,
            attempts,
            posted_at: Some(chrono::Utc::now().timestamp()),
        }
    }

    pub fn failed(
        order: usize,
        text: String,
        error: String,
        reply_to: Option<String>,
        attempts: u32,
    ) -> Self {
        Self {
            order,
            success: false,
            text,
            remote_id: None,
            error: Some(error),
            reply_to,
            attempts,
            posted_at: None,
        }
    }
}
