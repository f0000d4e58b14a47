//! Feedback Funnel - terminal dashboard for classified customer feedback
//!
//! Fetches the feedback snapshot from the Feedback Funnel API, aggregates
//! it and renders summary cards, the category breakdown, the sentiment
//! distribution and the recent feedback table.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad config, feedback could not be loaded, write failure)

mod analysis;
mod cli;
mod client;
mod config;
mod dashboard;
mod models;
mod report;
mod theme;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use client::{FeedbackSource, HttpFeedbackSource};
use config::{Config, DEFAULT_CONFIG_FILE};
use dashboard::{Dashboard, DashboardState, Session};
use indicatif::{ProgressBar, ProgressStyle};
use report::{render_state, RenderOptions, ReportMetadata};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    if args.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    info!("feedback-funnel v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .feedback-funnel.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to point at your API and adjust the layout.");
    Ok(())
}

/// Initialize logging based on verbosity settings. Logs go to stderr so
/// stdout only carries the rendered dashboard.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration, build the client and run the requested mode.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let source = HttpFeedbackSource::new(&config.api.base_url, config.api.timeout_seconds)?;
    let options = RenderOptions::from(&config.report);

    if args.interactive {
        let clear = args.format == OutputFormat::Terminal && console::Term::stdout().is_term();
        let mut session = Session::new(Arc::new(source), args.format, options, std::io::stdout())
            .with_clear_screen(clear);
        session
            .run(tokio::io::BufReader::new(tokio::io::stdin()))
            .await?;
        return Ok(0);
    }

    run_once(&source, &args, &options).await
}

/// One-shot mode: fetch once, render once.
async fn run_once(source: &HttpFeedbackSource, args: &Args, options: &RenderOptions) -> Result<i32> {
    let start_time = Instant::now();
    let mut dashboard = Dashboard::new();

    let spinner = loading_spinner(args);
    let request = dashboard.start_fetch();
    let result = source.fetch_feedback().await;
    spinner.finish_and_clear();

    dashboard.apply(request, result);

    if let DashboardState::Error(message) = dashboard.state() {
        eprintln!("\n❌ {}", message);
        eprintln!("   Run the command again to retry.");
        return Ok(1);
    }

    if let Some(aggregation) = dashboard.aggregation() {
        info!(
            "Loaded {} feedback records ({} processed, {} pending)",
            aggregation.stats.total, aggregation.stats.processed, aggregation.stats.pending
        );
    }

    let metadata = ReportMetadata {
        api_url: source.describe(),
        generated_at: Utc::now(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let output = render_state(dashboard.state(), metadata, args.format, options)?;

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                eprintln!("✅ Report saved to: {}", path.display());
            }
        }
        None => println!("{}", output),
    }

    Ok(0)
}

/// Spinner shown on stderr while the snapshot loads.
fn loading_spinner(args: &Args) -> ProgressBar {
    if args.quiet || !console::Term::stderr().is_term() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(report::LOADING_MESSAGE);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
