//! Site-Sweep main entry point
//!
//! This is the command-line interface for the Site-Sweep site auditor.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use site_sweep::config::{load_config_with_hash, validate, Config};
use site_sweep::crawler::{Crawl, CrawlReport};
use site_sweep::detector::{BrowserCommandDetector, ResourceIssueDetector};
use site_sweep::output::{
    diff_files, print_statistics, CrawlStatistics, MarkdownSummaryWriter, ReportWriter,
    TextReportWriter,
};
use tracing_subscriber::EnvFilter;

/// Site-Sweep: crawls one web site and reports broken and hardcoded links
///
/// Site-Sweep follows every link inside the start URL's registered domain,
/// checks links leaving it, and writes one report file per finding type.
#[derive(Parser, Debug)]
#[command(name = "site-sweep")]
#[command(version = "1.0.0")]
#[command(about = "Crawls a web site and reports broken and hardcoded links", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site and write the reports
    Crawl(CrawlArgs),

    /// Run the browser detector over an existing URL list
    CheckUrls(CheckUrlsArgs),

    /// Print lines present in one URL list but not the other
    Diff {
        first: PathBuf,
        second: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct CrawlArgs {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Start URL (overrides the configuration file)
    #[arg(long)]
    url: Option<String>,

    /// Sitemap URL (defaults to /sitemap.xml on the start URL's host)
    #[arg(long)]
    sitemap_url: Option<String>,

    /// Maximum number of pages fetched at once
    #[arg(long)]
    max_concurrency: Option<u32>,

    /// Directory the report files are written to
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Run the browser detector over the internal pages after the crawl
    #[arg(long)]
    js_errors: bool,
}

#[derive(clap::Args, Debug)]
struct CheckUrlsArgs {
    /// File with one URL per line
    urls: PathBuf,

    /// Configuration file providing the [browser] section
    #[arg(long)]
    config: Option<PathBuf>,

    /// Browser program (overrides the configuration file)
    #[arg(long)]
    program: Option<PathBuf>,

    /// Script passed to the browser program
    #[arg(long)]
    script: Option<PathBuf>,

    /// Seconds before a browser process is killed
    #[arg(long, default_value_t = 900)]
    timeout: u64,

    /// Number of browser processes
    #[arg(long, default_value_t = 3)]
    workers: usize,

    /// Directory resource_issues.txt is written to
    #[arg(long, default_value = ".")]
    report_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => handle_crawl(args).await,
        Command::CheckUrls(args) => handle_check_urls(args).await,
        Command::Diff { first, second } => handle_diff(&first, &second),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_sweep=info,warn"),
            1 => EnvFilter::new("site_sweep=debug,info"),
            2 => EnvFilter::new("site_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration (if any) and applies command-line overrides
fn resolve_config(args: &CrawlArgs) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => match &args.url {
            Some(url) => (Config::with_start_url(url), None),
            None => bail!("Either a configuration file or --url is required"),
        },
    };

    if let Some(url) = &args.url {
        config.crawler.start_url = url.clone();
    }
    if let Some(sitemap) = &args.sitemap_url {
        config.crawler.sitemap_url = Some(sitemap.clone());
    }
    if let Some(concurrency) = args.max_concurrency {
        config.crawler.max_concurrency = concurrency;
    }
    if let Some(dir) = &args.report_dir {
        config.output.report_dir = dir.display().to_string();
        config.output.summary_path = dir.join("summary.md").display().to_string();
    }

    validate(&config).context("Invalid configuration after applying command-line options")?;
    Ok((config, hash))
}

/// Handles the crawl subcommand: crawls, writes reports, optionally runs the detector
async fn handle_crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let (config, config_hash) = resolve_config(&args)?;

    let browser = match (&config.browser, args.js_errors) {
        (Some(browser), true) => Some(BrowserCommandDetector::from_config(browser)),
        (None, true) => bail!("--js-errors requires a [browser] section in the configuration"),
        (_, false) => None,
    };

    let text_writer = TextReportWriter::new(&config.output.report_dir);
    let mut summary_writer = MarkdownSummaryWriter::new(&config.output.summary_path);
    if let Some(hash) = &config_hash {
        summary_writer = summary_writer.with_config_hash(hash.as_str());
    }

    let crawl = Crawl::new(config)?;
    let token = crawl.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight pages");
            token.cancel();
        }
    });

    let report = crawl.run().await?;
    write_reports(&report, &text_writer, &summary_writer)?;

    if let Some(detector) = browser {
        let detection = detector
            .detect(&text_writer.internal_inventory_path())
            .await
            .context("Resource issue detection failed")?;
        text_writer.write_resource_issues(&detection)?;
    }

    print_statistics(&CrawlStatistics::from_report(&report));

    if report.cancelled {
        println!("\nCrawl was interrupted; reports cover finished pages only.");
    }

    Ok(())
}

fn write_reports(
    report: &CrawlReport,
    text_writer: &TextReportWriter,
    summary_writer: &MarkdownSummaryWriter,
) -> anyhow::Result<()> {
    let mut written = text_writer.write(report)?;
    written.extend(summary_writer.write(report)?);

    for path in &written {
        tracing::debug!("Report: {}", path.display());
    }
    Ok(())
}

/// Handles the check-urls subcommand: runs the detector alone
async fn handle_check_urls(args: CheckUrlsArgs) -> anyhow::Result<()> {
    let from_config = match &args.config {
        Some(path) => {
            let (config, _) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            config.browser
        }
        None => None,
    };

    let detector = match (args.program, args.script, from_config) {
        (Some(program), Some(script), _) => BrowserCommandDetector::new(
            program,
            script,
            Duration::from_secs(args.timeout),
            args.workers,
        ),
        (_, _, Some(browser)) => BrowserCommandDetector::from_config(&browser),
        _ => bail!("Provide --program and --script, or a configuration with a [browser] section"),
    };

    let detection = detector
        .detect(&args.urls)
        .await
        .with_context(|| format!("Failed to check {}", args.urls.display()))?;

    let path = TextReportWriter::new(&args.report_dir).write_resource_issues(&detection)?;
    println!(
        "{} pages reported issues; details in {}",
        detection.issues.len(),
        path.display()
    );
    if detection.timed_out {
        println!("At least one browser run timed out; results are partial.");
    }

    Ok(())
}

/// Handles the diff subcommand
fn handle_diff(first: &Path, second: &Path) -> anyhow::Result<()> {
    let diff = diff_files(first, second)?;
    print!(
        "{}",
        diff.render(&first.display().to_string(), &second.display().to_string())
    );
    Ok(())
}
