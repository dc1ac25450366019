//! Threadcast - long-form content as reply-chain threads
//!
//! This library splits long-form content into platform-sized segments and
//! publishes them, in order, as a reply chain on a micro-posting platform.
//! A failed segment never aborts the thread; the result is an aggregated
//! status plus one outcome per segment.

pub mod composer;
pub mod config;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod service;
pub mod tier;
pub mod types;

// Re-export commonly used types
pub use composer::{ComposeRequest, ThreadComposer};
pub use config::Config;
pub use error::{Result, ThreadcastError};
pub use platforms::PlatformClient;
pub use service::{PublishReport, ThreadPoster, ThreadcastService};
pub use types::{PostingOutcome, Segment, Strategy, Thread, ThreadId, ThreadStatus, Tier};
