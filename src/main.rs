//! loadscan - concurrent scanner over a host's loaded elements.
//!
//! Usage:
//!   loadscan demo              Scan a synthetic host and print a summary
//!   loadscan list              List the synthetic host's elements
//!   loadscan --help            Show help

mod demo;

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use loadscan_core::{Element, ScanConfig, ScanMode, ScanStats, always};
use loadscan_scan::LoadedDataSource;

use demo::{DemoHost, DemoLayout};

#[derive(Parser)]
#[command(
    name = "loadscan",
    version,
    about = "Concurrent, fault-tolerant scanner over a host's loaded elements",
    long_about = "loadscan runs its scanning engine against a synthetic host so the \
                  exclusion, fault-isolation and timeout behavior can be observed.\n\n\
                  Set LOADSCAN_LOG (e.g. LOADSCAN_LOG=debug) to see engine logs."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run both matching scans and show a summary
    Demo {
        #[command(flatten)]
        host: HostArgs,

        /// Leaf threshold (ranges this small are scanned serially)
        #[arg(long, default_value = "100")]
        leaf: usize,

        /// Worker threads (0 = available parallelism)
        #[arg(short, long, default_value = "0")]
        threads: usize,

        /// Scan timeout in milliseconds
        #[arg(long, default_value = "120000")]
        timeout_ms: u64,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List every element of the synthetic host
    List {
        #[command(flatten)]
        host: HostArgs,
    },
}

#[derive(Args, Clone, Copy)]
struct HostArgs {
    /// Number of elements in the synthetic collection
    #[arg(short = 'n', long, default_value = "250")]
    elements: u64,

    /// Elements named in the scanner's own namespace
    #[arg(long, default_value = "50")]
    family: u64,

    /// Elements the host refuses to let anyone modify
    #[arg(long, default_value = "40")]
    locked: u64,

    /// Elements whose inspection fails
    #[arg(long, default_value = "0")]
    failing: u64,

    /// Milliseconds each inspection sleeps
    #[arg(long, default_value = "0")]
    delay_ms: u64,
}

impl HostArgs {
    fn layout(self) -> DemoLayout {
        DemoLayout {
            elements: self.elements,
            family: self.family,
            locked: self.locked,
            failing: self.failing,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Result of one matching scan, as printed.
#[derive(Serialize)]
struct ScanSummary {
    mode: ScanMode,
    matched: usize,
    timed_out: bool,
    stats: Option<ScanStats>,
    elapsed_ms: Option<u64>,
}

#[derive(Serialize)]
struct DemoSummary {
    loaded: usize,
    workers: usize,
    scans: Vec<ScanSummary>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Demo {
            host,
            leaf,
            threads,
            timeout_ms,
            format,
        } => {
            run_demo(host, leaf, threads, timeout_ms, format)?;
        }
        Command::List { host } => {
            run_list(host)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOADSCAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the unrestricted and the eligible scan and print what each found.
fn run_demo(host: HostArgs, leaf: usize, threads: usize, timeout_ms: u64, format: OutputFormat) -> Result<()> {
    let config = ScanConfig::builder()
        .leaf_threshold(leaf)
        .threads(threads)
        .timeout_ms(timeout_ms)
        .build()
        .context("Invalid scan configuration")?;

    let source = LoadedDataSource::with_config(Arc::new(DemoHost::new(host.layout())), config)
        .context("Failed to start scanner")?;
    debug!(?source, "scanner ready");

    eprintln!("Scanning {} synthetic elements...", host.elements);

    let scans = [ScanMode::All, ScanMode::Eligible]
        .into_iter()
        .map(|mode| match source.scan(mode, always()) {
            Ok(report) => ScanSummary {
                mode,
                matched: report.len(),
                timed_out: false,
                stats: Some(report.stats),
                elapsed_ms: Some(report.elapsed.as_millis() as u64),
            },
            Err(err) => {
                eprintln!("{mode} scan did not complete: {err}");
                ScanSummary {
                    mode,
                    matched: 0,
                    timed_out: err.is_timeout(),
                    stats: None,
                    elapsed_ms: None,
                }
            }
        })
        .collect();

    let summary = DemoSummary {
        loaded: source.list_all().len(),
        workers: source.worker_count(),
        scans,
    };

    match format {
        OutputFormat::Text => print_summary(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

fn print_summary(summary: &DemoSummary) {
    println!();
    println!("{}", "─".repeat(60));
    println!(" {} loaded elements, {} workers", summary.loaded, summary.workers);
    println!("{}", "─".repeat(60));
    println!();

    for scan in &summary.scans {
        match (&scan.stats, scan.elapsed_ms) {
            (Some(stats), Some(elapsed_ms)) => {
                println!(" {:<9} {:>6} matched  in {}ms", scan.mode, scan.matched, elapsed_ms);
                println!(
                    "           {} family, {} locked, {} failed inspection, {} failed matcher",
                    stats.skipped_family,
                    stats.skipped_unmodifiable,
                    stats.inspection_failures,
                    stats.match_failures
                );
                println!("           {} leaves, {} forks", stats.leaves, stats.forks);
            }
            _ if scan.timed_out => println!(" {:<9} timed out, no results", scan.mode),
            _ => println!(" {:<9} failed, no results", scan.mode),
        }
        println!();
    }
}

/// Print the unfiltered listing.
fn run_list(host: HostArgs) -> Result<()> {
    let source = LoadedDataSource::new(Arc::new(DemoHost::new(host.layout())))
        .context("Failed to start scanner")?;

    for element in source.list_all() {
        let owner = element
            .owner()
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| "<root>".to_string());
        println!("{:>6}  {:<32} {}", element.id().0, element.name(), owner);
    }

    Ok(())
}
