// src/main.rs

mod cli;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use cli::Args;
use indicatif::ProgressBar;
use issue_spoilage::model::Day;
use issue_spoilage::renderer::{self, ChartPaths, Layout};
use issue_spoilage::{analyzer, loader};
use std::env;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let start_time = Instant::now();

    let paths = ChartPaths {
        open: args.open_issues_graph_filename.clone(),
        closed: args.closed_issues_graph_filename.clone(),
        spoiled: args.line_of_issues_spoilage_filename.clone(),
        joint: args.joint_graph_filename.clone(),
    };
    for path in [&paths.open, &paths.closed, &paths.spoiled, &paths.joint] {
        if !renderer::is_supported_image(path) {
            bail!("unsupported chart file type: {}", path.display());
        }
    }

    let today = args.now.unwrap_or_else(|| Utc::now().date_naive());
    let loaded = loader::load_issues(&args.input)
        .with_context(|| format!("failed to load issues from {}", args.input.display()))?;
    let mut issues = loaded.records;

    if let Some(max_age) = args.max_age_days {
        loader::retain_recent(&mut issues, today, i64::from(max_age));
        if let Some(path) = &args.save_filtered {
            loader::save_json(&issues, path).context("failed to save filtered issues")?;
        }
    }

    let bar = ProgressBar::new_spinner();
    bar.set_message("Counting issues per day");
    let tick = |_: Day| bar.inc(1);
    let mut report = analyzer::analyze_with_progress(&issues, today, &tick)
        .with_context(|| format!("no usable issues in {}", args.input.display()))?;
    let mut rejected = loaded.rejected;
    rejected.append(&mut report.rejected);
    report.rejected = rejected;
    bar.finish_with_message("Counting complete");

    info!(
        "Analysis finished in {:.2?}. {} issues, {} rejected, days {} to {}.",
        start_time.elapsed(),
        issues.len(),
        report.rejected.len(),
        report.window.first,
        report.window.last
    );

    if let Some(path) = &args.save_json {
        loader::save_json(&report, path).context("failed to save report")?;
    }

    let layout = Layout {
        width: args.width,
        height: args.height,
        first_day: args.lower_window_bound.unwrap_or(report.window.first),
        last_day: args.upper_window_bound.unwrap_or(report.window.last),
    };
    if layout.first_day > layout.last_day {
        bail!("lower window bound {} is after upper window bound {}", layout.first_day, layout.last_day);
    }

    let render_start = Instant::now();
    renderer::render_charts(&renderer::report_charts(&report, &paths), layout).context("failed to render charts")?;
    info!("Rendering finished in {:.2?}.", render_start.elapsed());
    info!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ISSUE_SPOILAGE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "issue_spoilage=debug,info" } else { "info" }));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
    if env::var_os("ISSUE_SPOILAGE_LOG").is_some() && verbose {
        warn!("--verbose ignored because ISSUE_SPOILAGE_LOG is set");
    }
}
