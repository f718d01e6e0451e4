// src/cli.rs

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Graph open, closed and spoiled issues per day", long_about = None)]
pub struct Args {
    /// Issue dump (JSON array) to analyze
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output PNG for open issues per day
    #[arg(short = 'o', long)]
    pub open_issues_graph_filename: PathBuf,

    /// Output PNG for closed issues per day
    #[arg(short = 'c', long)]
    pub closed_issues_graph_filename: PathBuf,

    /// Output PNG for spoiled issues per day
    #[arg(short = 'd', long)]
    pub line_of_issues_spoilage_filename: PathBuf,

    /// Output PNG combining open, closed and spoiled issues
    #[arg(short = 'x', long)]
    pub joint_graph_filename: PathBuf,

    /// First day shown in the charts (inclusive)
    #[arg(short, long, allow_hyphen_values = true)]
    pub lower_window_bound: Option<i64>,

    /// Last day shown in the charts (inclusive)
    #[arg(short, long, allow_hyphen_values = true)]
    pub upper_window_bound: Option<i64>,

    /// Save the per-day series and rejected records as JSON
    #[arg(short, long)]
    pub save_json: Option<PathBuf>,

    /// Ignore issues created more than this many days before today
    #[arg(long)]
    pub max_age_days: Option<u32>,

    /// Save the issues left after the age filter as JSON
    #[arg(long, requires = "max_age_days")]
    pub save_filtered: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today instead of the current UTC date
    #[arg(long)]
    pub now: Option<NaiveDate>,

    /// Width of the output images in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Height of the output images in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const REQUIRED: [&str; 11] = [
        "issue-spoilage", "-i", "issues.json", "-o", "open.png", "-c", "closed.png", "-d", "spoiled.png", "-x",
        "joint.png",
    ];

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_required_and_defaults() {
        let args = Args::try_parse_from(REQUIRED).unwrap();
        assert_eq!(args.input, PathBuf::from("issues.json"));
        assert_eq!(args.joint_graph_filename, PathBuf::from("joint.png"));
        assert_eq!((args.width, args.height), (1280, 720));
        assert_eq!(args.lower_window_bound, None);
        assert!(args.now.is_none());
    }

    #[test]
    fn parses_optional_settings() {
        let mut argv: Vec<&str> = REQUIRED.to_vec();
        argv.extend(["-l", "3", "-u", "40", "--now", "2021-05-01", "--max-age-days", "40", "--save-filtered", "f.json"]);
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.lower_window_bound, Some(3));
        assert_eq!(args.upper_window_bound, Some(40));
        assert_eq!(args.now, NaiveDate::from_ymd_opt(2021, 5, 1));
        assert_eq!(args.max_age_days, Some(40));
    }

    #[test]
    fn filtered_save_needs_age_filter() {
        let mut argv: Vec<&str> = REQUIRED.to_vec();
        argv.extend(["--save-filtered", "f.json"]);
        assert!(Args::try_parse_from(argv).is_err());
    }
}
