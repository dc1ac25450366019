//! End-to-end tests: compose content, publish it through a mock client, and
//! check the reply chain and aggregated status.

use std::time::Duration;

use libthreadcast::config::{ComposerConfig, Config, PostingConfig};
use libthreadcast::error::{PlatformError, ThreadcastError};
use libthreadcast::platforms::mock::{MockClient, MockResponse};
use libthreadcast::platforms::PlatformClient;
use libthreadcast::service::{ThreadEvent, ThreadcastService};
use libthreadcast::types::{Strategy, Thread, ThreadStatus, Tier};
use libthreadcast::ComposeRequest;

fn setup_test_service() -> ThreadcastService {
    let config = Config {
        posting: PostingConfig {
            inter_post_delay: Duration::ZERO,
            continuation_marker: None,
            ..Default::default()
        },
        ..Default::default()
    };
    ThreadcastService::from_config(config).unwrap()
}

fn essay(sentences: usize) -> String {
    (1..=sentences)
        .map(|i| format!("Point {} of the essay adds another short observation.", i))
        .collect::<Vec<_>>()
        .join(" ")
}

fn compose(service: &ThreadcastService, content: &str) -> Thread {
    service
        .compose(ComposeRequest {
            id: "thread-42".into(),
            content: content.to_string(),
            title: Some("Essay".to_string()),
            tier: Tier::Standard,
        })
        .unwrap()
}

#[tokio::test]
async fn test_long_essay_posts_as_reply_chain() {
    let service = setup_test_service();
    let mut thread = compose(&service, &essay(25));
    assert_eq!(thread.strategy, Strategy::MultiSegmentThread);
    let total = thread.len();

    let client = MockClient::success("mock");
    let report = service.publish(&mut thread, &client).await.unwrap();

    assert_eq!(report.status, ThreadStatus::Posted);
    assert_eq!(report.outcomes.len(), total);
    assert_eq!(client.call_count(), total);

    // Every reply points at the post right before it
    let calls = client.calls();
    assert!(calls[0].reply_to.is_none());
    for pair in calls.windows(2) {
        assert_eq!(pair[1].reply_to, pair[0].remote_id);
    }

    // Posted text is exactly the composed segments, in order
    let texts: Vec<String> = thread.segments.iter().map(|s| s.text.clone()).collect();
    assert_eq!(client.published(), texts);
}

#[tokio::test]
async fn test_intermittent_failures_yield_partial() {
    let service = setup_test_service();
    let mut thread = compose(&service, &essay(25));
    assert!(thread.len() >= 4);

    let client = MockClient::scripted(
        "mock",
        vec![
            MockResponse::Fail(PlatformError::Network("reset".to_string())),
            MockResponse::Success,
            MockResponse::Malformed,
            MockResponse::Success,
        ],
    );

    let report = service.publish(&mut thread, &client).await.unwrap();

    assert_eq!(report.status, ThreadStatus::Partial);
    assert_eq!(thread.status, ThreadStatus::Partial);
    assert_eq!(report.outcomes.len(), thread.len());

    for (outcome, segment) in report.outcomes.iter().zip(&thread.segments) {
        assert_eq!(outcome.order, segment.order);
        assert_eq!(outcome.success, outcome.remote_id.is_some());
        assert_eq!(outcome.success, outcome.error.is_none());
    }

    // Segment 2 became the root; segment 4 skips the failed segment 3
    let calls = client.calls();
    assert!(calls[1].reply_to.is_none());
    assert_eq!(calls[3].reply_to, calls[1].remote_id);
    assert_eq!(report.root_id(), calls[1].remote_id.as_deref());
}

#[tokio::test]
async fn test_everything_fails() {
    let service = setup_test_service();
    let mut thread = compose(&service, &essay(10));

    let client = MockClient::failing("mock", PlatformError::Authentication("revoked".to_string()));
    let report = service.publish(&mut thread, &client).await.unwrap();

    assert_eq!(report.status, ThreadStatus::Failed);
    assert!(report.remote_ids().is_empty());
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.error.as_deref().unwrap_or_default().contains("revoked")));
}

#[tokio::test]
async fn test_published_thread_cannot_be_republished() {
    let service = setup_test_service();
    let mut thread = compose(&service, "One short post.");

    let client = MockClient::success("mock");
    service.publish(&mut thread, &client).await.unwrap();

    let err = service.publish(&mut thread, &client).await.unwrap_err();
    assert!(matches!(err, ThreadcastError::InvalidState { .. }));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_progress_events_cover_every_segment() {
    let service = setup_test_service();
    let mut events = service.subscribe();
    let mut thread = compose(&service, &essay(15));
    let total = thread.len();

    let client = MockClient::scripted(
        "mock",
        vec![
            MockResponse::Success,
            MockResponse::Fail(PlatformError::Posting("rejected".to_string())),
        ],
    );
    service.publish(&mut thread, &client).await.unwrap();

    let mut posted = 0;
    let mut failed = 0;
    let mut finished = None;
    while let Ok(event) = events.try_recv() {
        match event {
            ThreadEvent::SegmentPosted { .. } => posted += 1,
            ThreadEvent::SegmentFailed { .. } => failed += 1,
            ThreadEvent::PublishFinished { status, .. } => finished = Some(status),
            ThreadEvent::PublishStarted { segments, .. } => assert_eq!(segments, total),
        }
    }

    assert_eq!(posted + failed, total);
    assert_eq!(failed, 1);
    assert_eq!(finished, Some(ThreadStatus::Partial));
}

#[tokio::test]
async fn test_publish_is_sequential() {
    let service = setup_test_service();
    let mut thread = compose(&service, &essay(12));
    let total = thread.len();

    // Sequential calls add up; parallel calls would finish in one delay
    let client = MockClient::with_delay("mock", Duration::from_millis(20));
    let start = std::time::Instant::now();
    service.publish(&mut thread, &client).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(20 * total as u64));
    assert_eq!(client.name(), "mock");
}

#[tokio::test]
async fn test_continuation_marker_respects_client_limit() {
    let config = Config {
        composer: ComposerConfig {
            standard_budget: 55,
            segment_indicators: false,
            ..Default::default()
        },
        posting: PostingConfig {
            inter_post_delay: Duration::ZERO,
            continuation_marker: Some("(cont.)".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let service = ThreadcastService::from_config(config).unwrap();

    // 39, 19 and 40 characters; no two fit one 55 character post
    let opening = "The opening paragraph sets up the idea.";
    let short = "A short reply here.";
    let at_limit = "The closing reply runs to the limit now.";
    let mut thread = compose(&service, &format!("{}\n\n{}\n\n{}", opening, short, at_limit));
    assert_eq!(thread.len(), 3);

    // The tier budget would leave room for the marker after the last
    // segment; the client's 40 character limit does not
    let client = MockClient::with_limit("mock", 40);
    let report = service.publish(&mut thread, &client).await.unwrap();

    assert_eq!(report.status, ThreadStatus::Posted);
    assert_eq!(
        client.published(),
        vec![
            opening.to_string(),
            format!("{} (cont.)", short),
            at_limit.to_string(),
        ]
    );
    assert!(client
        .published()
        .iter()
        .all(|text| text.chars().count() <= 40));
}
