//! Facilities-management report builder CLI
//!
//! Usage:
//!   fm_report period --start 2025-01-15 --end 2025-02-15
//!   fm_report sections
//!   fm_report normalize --section site_wise_checklist --file payloads/site_wise_checklist.json
//!   fm_report build --config config/fm_report.toml
//!   fm_report build --config config/fm_report.toml --mock --output report.json
//!   fm_report build --config config/fm_report.toml --input-dir payloads/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use fm_report::{
    collect::{collect_with_progress, CollectOptions},
    config::Config,
    period::{classify, DateRange},
    report::{build_report, normalize_section},
    section::Section,
    source::{FileSource, HttpSource, MockSource, ReportSource},
};

#[derive(Parser)]
#[command(name = "fm_report")]
#[command(about = "Normalize facilities-management report payloads into report tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a date range into its comparison period
    Period {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Reject unparseable or inverted ranges instead of degrading
        #[arg(long)]
        strict: bool,
    },
    /// List report sections and their endpoints
    Sections,
    /// Normalize one captured payload and print the result
    Normalize {
        #[arg(long)]
        section: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Fetch every configured section and write the assembled report
    Build {
        #[arg(long, default_value = "config/fm_report.toml")]
        config: PathBuf,
        /// Use synthetic payloads instead of the API
        #[arg(long, conflicts_with = "input_dir")]
        mock: bool,
        #[arg(long, default_value = "6")]
        mock_sites: usize,
        /// Read `<section>.json` payloads from this directory
        #[arg(long)]
        input_dir: Option<PathBuf>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        no_progress: bool,
    },
}

fn run_period(start: &str, end: &str, strict: bool) -> Result<()> {
    let range = DateRange::parse(start, end);
    if strict {
        range.validate()?;
    }
    let info = classify(&range);
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn run_sections() {
    for section in Section::ALL {
        println!("{:<40} {}", section.as_str(), section.endpoint());
    }
}

fn run_normalize(section: &str, file: &Path) -> Result<()> {
    let section: Section = section.parse()?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read payload from {:?}", file))?;
    let payload: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse payload JSON in {:?}", file))?;
    let normalized = normalize_section(section, &payload);
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

fn progress_bar(len: usize, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")?);
    Ok(bar)
}

#[allow(clippy::too_many_arguments)]
async fn run_build(
    config_path: &Path,
    mock: bool,
    mock_sites: usize,
    input_dir: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
    output: Option<PathBuf>,
    no_progress: bool,
) -> Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(start) = start {
        config.report.start_date = start;
    }
    if let Some(end) = end {
        config.report.end_date = end;
    }

    let range = config.report.date_range();
    if let Err(e) = range.validate() {
        tracing::warn!("{}; continuing with degraded period classification", e);
    }
    let sections = config.report.selected_sections()?;

    let source: Box<dyn ReportSource> = if mock {
        Box::new(MockSource::new(mock_sites))
    } else if let Some(dir) = input_dir {
        Box::new(FileSource::new(dir))
    } else {
        Box::new(HttpSource::new(&config.api).context("Failed to create HTTP report source")?)
    };
    tracing::info!(source = source.name(), sections = sections.len(), "building report for {}", range);

    let bar = progress_bar(sections.len(), no_progress)?;
    let options = CollectOptions::from_api(&config.api);
    let bundle = collect_with_progress(source.as_ref(), &sections, &range, &options, Some(&bar)).await;
    bar.finish_and_clear();

    for (section, reason) in bundle.failures() {
        tracing::warn!("{} left empty: {}", section, reason);
    }

    let report = build_report(&bundle, &range);
    let output = output.unwrap_or_else(|| PathBuf::from(&config.report.output));
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&output, json)
        .with_context(|| format!("Failed to write report to {:?}", output))?;

    println!(
        "{} report ({}) written to {} [{} of {} sections ready]",
        report.period.period_label,
        report.date_range,
        output.display(),
        bundle.ready_count(),
        sections.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Period { start, end, strict } => run_period(&start, &end, strict)?,
        Commands::Sections => run_sections(),
        Commands::Normalize { section, file } => run_normalize(&section, &file)?,
        Commands::Build {
            config,
            mock,
            mock_sites,
            input_dir,
            start,
            end,
            output,
            no_progress,
        } => {
            run_build(&config, mock, mock_sites, input_dir, start, end, output, no_progress).await?
        }
    }

    Ok(())
}
