mod cli;

use clap::Parser;
use cli::Opts;
use reddit_client::RedditClient;
use report_writer::ReportWriter;
use researcher::{fetch_subreddit_data, FetchOptions};
use researcher_core::{AppConfig, CoreError, ErrorReporter};
use std::backtrace::Backtrace;
use std::process::ExitCode;
use text_enrichment::EnrichmentService;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let opts = Opts::parse();

    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(error) => {
            let mut fallback = AppConfig::default();
            fallback.apply_env();
            return fail(&error, &fallback);
        }
    };

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => fail(&error, &config),
    }
}

fn load_config(opts: &Opts) -> Result<AppConfig, CoreError> {
    let mut config = AppConfig::from_file(opts.config_path().as_deref())?;
    config.apply_env();
    opts.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(config: &AppConfig) -> Result<(), CoreError> {
    let research = &config.research;
    info!("Starting research of r/{}", research.subreddit);

    let client = RedditClient::from_config(&config.reddit)?;
    let session = client.authenticate().await?;

    let enricher = EnrichmentService::new(&config.enrichment);
    let options = FetchOptions::from(research);
    let records = fetch_subreddit_data(&session, &enricher, &options).await?;

    let writer = ReportWriter::new(&research.output_dir);
    let summary = writer.write_all(&records, &research.subreddit);
    if !summary.failures().is_empty() {
        warn!(
            "{} of 3 report files could not be written",
            summary.failures().len()
        );
    }

    let metrics = session.get_api_metrics().await;
    info!(
        "Done: {} posts, {} files written, {} API requests ({:.0}% ok, avg {:?})",
        records.len(),
        summary.written().len(),
        metrics.total_requests,
        metrics.success_rate() * 100.0,
        metrics.average_response_time()
    );
    Ok(())
}

fn fail(error: &CoreError, config: &AppConfig) -> ExitCode {
    let reporter = ErrorReporter::new();
    reporter.report_error(error);

    eprint!("{}", reporter.diagnostics(error, &config.credential_presence()));
    eprintln!("Backtrace:\n{}", Backtrace::force_capture());

    ExitCode::FAILURE
}
