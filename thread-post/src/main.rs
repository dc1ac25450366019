//! thread-post - Publish long-form content as a reply-chain thread

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

use libthreadcast::config::Config;
use libthreadcast::error::ConfigError;
use libthreadcast::logging::{self, LogFormat};
use libthreadcast::platforms::mastodon::MastodonClient;
use libthreadcast::platforms::mock::MockClient;
use libthreadcast::{
    ComposeRequest, PublishReport, Thread, ThreadId, ThreadStatus, ThreadcastError,
    ThreadcastService, Tier,
};

#[derive(Parser, Debug)]
#[command(name = "thread-post")]
#[command(version)]
#[command(about = "Publish long-form content as a reply-chain thread")]
#[command(long_about = "\
thread-post - Publish long-form content as a reply-chain thread

DESCRIPTION:
    thread-post splits content into posts that fit the account's character
    budget, breaking at paragraph, then sentence, then word boundaries, and
    publishes them in order, each as a reply to the previous one. A segment
    that fails is reported and skipped; the rest of the thread still goes out.

USAGE EXAMPLES:
    # Publish a file
    thread-post --file essay.md --title \"On threads\"

    # Preview the segments without touching the network
    thread-post --file essay.md --dry-run

    # Pipe content in and get a JSON report
    cat essay.md | thread-post --format json

CONFIGURATION:
    Configuration file: ~/.config/threadcast/config.toml
    Override with THREADCAST_CONFIG.

EXIT CODES:
    0 - Every segment was published
    1 - Some or all segments failed, or another error occurred
    2 - Authentication error
    3 - Invalid input (empty content, unknown tier, ...)
")]
struct Cli {
    /// Content to post (reads from --file or stdin if not provided)
    content: Option<String>,

    /// Read content from a file
    #[arg(long, conflicts_with = "content")]
    file: Option<PathBuf>,

    /// Thread title, kept as metadata
    #[arg(short, long)]
    title: Option<String>,

    /// Posting tier (standard or extended); asked from the instance if omitted
    #[arg(long)]
    tier: Option<String>,

    /// Thread id (a random UUID if omitted)
    #[arg(long)]
    id: Option<String>,

    /// Compose and run the thread against a local mock client
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = logging::config_from_env();
    if cli.verbose {
        log_config.verbose = true;
    } else if std::env::var("THREADCAST_LOG_LEVEL").is_err() {
        log_config.level = "error".to_string();
    }
    if cli.format == OutputFormat::Json && std::env::var("THREADCAST_LOG_FORMAT").is_err() {
        log_config.format = LogFormat::Json;
    }
    log_config.init();

    match run(cli).await {
        Ok(ThreadStatus::Posted) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<ThreadcastError>()
                .map_or(1, ThreadcastError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ThreadStatus> {
    let content = read_content(&cli)?;
    let explicit_tier = cli.tier.as_deref().map(str::parse::<Tier>).transpose()?;

    let mut config = Config::load()?;
    if cli.dry_run {
        config.posting.inter_post_delay = Duration::ZERO;
    }
    let mastodon = config.mastodon.clone();
    let service = ThreadcastService::from_config(config)?;

    let id = cli
        .id
        .map(ThreadId::from)
        .unwrap_or_else(|| ThreadId::new(uuid::Uuid::new_v4().to_string()));

    if cli.dry_run {
        let tier = explicit_tier.unwrap_or(Tier::Standard);
        info!("Dry run for thread {} ({} tier), nothing leaves this machine", id, tier);

        let mut thread = compose(&service, id, content, cli.title, tier)?;
        let client = MockClient::success("dry-run");
        let report = service.publish(&mut thread, &client).await?;

        print_result(cli.format, &thread, &report)?;
        return Ok(report.status);
    }

    let mastodon =
        mastodon.ok_or_else(|| ThreadcastError::from(ConfigError::MissingField("mastodon".to_string())))?;
    let mut client = MastodonClient::from_config(&mastodon)?;
    let limit = client
        .fetch_instance_info()
        .await
        .with_context(|| format!("Could not reach {}", client.instance_url()))?;

    let tier = match explicit_tier {
        Some(tier) => tier,
        None => {
            let tier = service.composer().config().tier_for_limit(limit);
            debug!(
                "{} accepts {} characters per post, using {} tier",
                client.instance_url(),
                limit,
                tier
            );
            tier
        }
    };
    info!("Publishing thread {} to {} ({} tier)", id, client.instance_url(), tier);

    let mut thread = compose(&service, id, content, cli.title, tier)?;
    let report = service.publish(&mut thread, &client).await?;

    print_result(cli.format, &thread, &report)?;
    Ok(report.status)
}

fn compose(
    service: &ThreadcastService,
    id: ThreadId,
    content: String,
    title: Option<String>,
    tier: Tier,
) -> libthreadcast::Result<Thread> {
    service.compose(ComposeRequest {
        id,
        content,
        title,
        tier,
    })
}

/// Content from the positional argument, `--file`, or piped stdin
fn read_content(cli: &Cli) -> anyhow::Result<String> {
    if let Some(content) = &cli.content {
        return Ok(content.clone());
    }

    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    if io::stdin().is_terminal() {
        bail!(ThreadcastError::InvalidInput(
            "No content provided. Pass it as an argument, with --file, or on stdin".to_string()
        ));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read content from stdin")?;
    Ok(buffer)
}

fn print_result(
    format: OutputFormat,
    thread: &Thread,
    report: &PublishReport,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "thread": thread,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print_text(thread, report),
    }
    Ok(())
}

fn print_text(thread: &Thread, report: &PublishReport) {
    println!(
        "Thread {}: {} segment{}, {} tier, ~{} min read",
        thread.id,
        thread.len(),
        if thread.len() == 1 { "" } else { "s" },
        thread.tier,
        thread.estimated_read_minutes
    );
    if let Some(title) = &thread.title {
        println!("Title: {}", title);
    }

    for outcome in &report.outcomes {
        println!();
        match &outcome.remote_id {
            Some(remote_id) => println!("[{}] {} {}", outcome.order, report.platform, remote_id),
            None => println!(
                "[{}] failed: {}",
                outcome.order,
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
        }
        println!("{}", outcome.text);
    }

    println!();
    println!(
        "Status: {} ({}/{} published)",
        report.status,
        report.succeeded(),
        report.outcomes.len()
    );
}
