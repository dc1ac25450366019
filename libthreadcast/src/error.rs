//! Error types for Threadcast

use thiserror::Error;

use crate::types::ThreadStatus;

pub type Result<T> = std::result::Result<T, ThreadcastError>;

#[derive(Error, Debug)]
pub enum ThreadcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Thread {thread_id} cannot be published from status '{status}'")]
    InvalidState {
        thread_id: String,
        status: ThreadStatus,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ThreadcastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ThreadcastError::InvalidInput(_) | ThreadcastError::EmptyContent => 3,
            ThreadcastError::Platform(PlatformError::Authentication(_)) => 2,
            ThreadcastError::Platform(_) => 1,
            ThreadcastError::Config(_) => 1,
            ThreadcastError::InvalidState { .. } => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors raised by a platform client while publishing a single segment.
///
/// Cloneable so that the retry loop can keep the last error around while
/// attempting again.
#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Malformed platform response: {0}")]
    MalformedResponse(String),
}

impl PlatformError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Network hiccups and rate limiting are transient; authentication,
    /// validation and malformed responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            PlatformError::Network(_) | PlatformError::RateLimit(_) => true,
            PlatformError::Authentication(_)
            | PlatformError::Validation(_)
            | PlatformError::Posting(_)
            | PlatformError::MalformedResponse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = ThreadcastError::InvalidInput("Unknown tier".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_empty_content() {
        assert_eq!(ThreadcastError::EmptyContent.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = ThreadcastError::Platform(PlatformError::Authentication(
            "Missing token".to_string(),
        ));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_platform_errors() {
        let errors = [
            PlatformError::Posting("test".to_string()),
            PlatformError::Network("test".to_string()),
            PlatformError::Validation("test".to_string()),
            PlatformError::RateLimit("test".to_string()),
            PlatformError::MalformedResponse("test".to_string()),
        ];

        for platform_error in errors {
            let error = ThreadcastError::Platform(platform_error);
            assert_eq!(error.exit_code(), 1, "{} should exit with code 1", error);
        }
    }

    #[test]
    fn test_exit_code_invalid_state() {
        let error = ThreadcastError::InvalidState {
            thread_id: "t-1".to_string(),
            status: ThreadStatus::Posted,
        };
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_invalid_state_message() {
        let error = ThreadcastError::InvalidState {
            thread_id: "t-1".to_string(),
            status: ThreadStatus::Partial,
        };
        assert_eq!(
            error.to_string(),
            "Thread t-1 cannot be published from status 'partial'"
        );
    }

    #[test]
    fn test_error_message_formatting_platform() {
        let error = ThreadcastError::Platform(PlatformError::Posting(
            "Failed to reach instance".to_string(),
        ));
        assert_eq!(
            error.to_string(),
            "Platform error: Posting failed: Failed to reach instance"
        );
    }

    #[test]
    fn test_error_message_formatting_config() {
        let error = ThreadcastError::Config(ConfigError::InvalidValue {
            field: "composer.standard_budget".to_string(),
            reason: "must be greater than zero".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid value for composer.standard_budget: must be greater than zero"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(PlatformError::Network("timeout".to_string()).is_transient());
        assert!(PlatformError::RateLimit("429".to_string()).is_transient());
        assert!(!PlatformError::Authentication("401".to_string()).is_transient());
        assert!(!PlatformError::Validation("422".to_string()).is_transient());
        assert!(!PlatformError::Posting("rejected".to_string()).is_transient());
        assert!(!PlatformError::MalformedResponse("empty id".to_string()).is_transient());
    }

    #[test]
    fn test_platform_error_clone() {
        let original = PlatformError::Network("Connection failed".to_string());
        let cloned = original.clone();

        assert_eq!(original.to_string(), cloned.to_string());
    }

    #[test]
    fn test_error_conversion_from_platform_error() {
        let error: ThreadcastError = PlatformError::Posting("test".to_string()).into();
        assert!(matches!(error, ThreadcastError::Platform(_)));
    }
}
