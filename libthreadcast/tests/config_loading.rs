//! Configuration file handling as seen by the service layer

use std::fs;
use std::time::Duration;

use libthreadcast::config::Config;
use libthreadcast::error::{ConfigError, ThreadcastError};
use libthreadcast::platforms::create_client;
use libthreadcast::service::{RetryPolicy, ThreadcastService};
use libthreadcast::types::Tier;
use libthreadcast::ComposeRequest;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_custom_budgets_drive_composition() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[composer]
standard_budget = 40
segment_indicators = false

[posting]
inter_post_delay = "0s"
retry = { mode = "bounded", max_attempts = 2, initial_backoff = "10ms" }
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.posting.inter_post_delay, Duration::ZERO);
    assert_eq!(
        config.posting.retry,
        RetryPolicy::Bounded {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(10),
        }
    );

    let service = ThreadcastService::from_config(config).unwrap();
    let thread = service
        .compose(ComposeRequest {
            id: "t-1".into(),
            content: "This sentence is long enough. So is this one, more or less.".to_string(),
            title: None,
            tier: Tier::Standard,
        })
        .unwrap();

    assert_eq!(thread.len(), 2);
    assert!(thread.segments.iter().all(|s| s.char_count <= 40));
}

#[test]
fn test_invalid_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[composer]\nstandard_budget = \"lots\"\n").unwrap();

    assert!(matches!(
        Config::load_from_path(&path),
        Err(ThreadcastError::Config(ConfigError::ParseError(_)))
    ));
}

#[test]
#[serial]
fn test_service_new_reads_env_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("threadcast.toml");
    fs::write(&path, "[composer]\nextended_budget = 1000\n").unwrap();
    std::env::set_var("THREADCAST_CONFIG", &path);

    let service = ThreadcastService::new();

    std::env::remove_var("THREADCAST_CONFIG");
    let service = service.unwrap();
    assert_eq!(service.composer().config().budget_for(Tier::Extended), 1000);
}

#[test]
fn test_client_requires_mastodon_section() {
    let err = create_client(&Config::default()).err().unwrap();
    assert!(matches!(
        err,
        ThreadcastError::Config(ConfigError::MissingField(_))
    ));
}
