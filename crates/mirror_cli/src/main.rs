//! Scheduled entry point for the changelog mirror.
//!
//! Runs the pipeline once and exits; a non-zero status signals a fatal
//! failure to the invoking scheduler.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_info, engine_warn, LogDestination};
use mirror_engine::{
    GitCli, MirrorConfig, NoopPublisher, PublishOutcome, Publisher, ReqwestFetcher,
};

const DEFAULT_URL: &str = "https://www.trae.ai/changelog";

/// Mirror a product changelog page into a git-tracked output directory.
#[derive(Parser, Debug)]
#[command(name = "changelog-mirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Changelog page to mirror.
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Output root; also the git working copy used for publishing.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Title for the document header; defaults to the page <title>.
    #[arg(long)]
    title: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Generate artifacts but skip the commit-and-push step.
    #[arg(long)]
    no_publish: bool,

    /// Also write logs to ./mirror.log.
    #[arg(long)]
    log_file: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    engine_logging::initialize(if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    });

    let mut config = MirrorConfig::new(cli.url, cli.output_dir);
    config.title = cli.title;
    config.fetch.request_timeout = Duration::from_secs(cli.timeout_secs);

    let fetcher = ReqwestFetcher::new(config.fetch.clone());
    let publisher: Box<dyn Publisher> = if cli.no_publish {
        Box::new(NoopPublisher)
    } else {
        Box::new(GitCli::new(config.output_dir.clone()))
    };

    engine_info!("starting changelog mirror for {}", config.page_url);
    let report = mirror_engine::run(&config, &fetcher, publisher.as_ref())
        .await
        .context("mirroring run failed")?;

    engine_info!(
        "wrote {} ({} bytes); images localized: {}, failed: {}",
        report.document_path.display(),
        report.bytes_written,
        report.images.localized(),
        report.images.failed()
    );
    match report.publish {
        PublishOutcome::NoChanges => engine_info!("nothing new to publish"),
        PublishOutcome::Pushed => engine_info!("published to remote"),
        PublishOutcome::Failed { step } => {
            engine_warn!("publish step {step:?} failed; artifacts were still generated")
        }
    }
    Ok(())
}
