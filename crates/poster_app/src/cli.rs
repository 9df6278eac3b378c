use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Publish scheduled image posts from a CSV queue.
#[derive(Parser, Debug, Clone)]
#[command(name = "poster", version, about = "Publish scheduled image posts from a CSV queue")]
pub struct Args {
    /// Queue file
    #[arg(long, default_value = "captions.csv")]
    pub csv: PathBuf,

    /// Directory that relative `filename` values are resolved against
    #[arg(long, default_value = "images")]
    pub images_dir: PathBuf,

    /// Walk the queue and record results without contacting any platform
    #[arg(long)]
    pub dry_run: bool,

    /// Number of posts to publish in next-scheduled mode
    #[arg(long, default_value_t = 1)]
    pub limit: usize,

    /// Publish every eligible row instead of the next scheduled one(s)
    #[arg(long)]
    pub all: bool,

    /// Only rows whose Category matches, ignoring case
    #[arg(long)]
    pub category: Option<String>,

    /// Only rows scheduled on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// Only rows scheduled on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<String>,

    /// Publishing backend
    #[arg(long, value_enum, default_value_t = Backend::Graph)]
    pub backend: Backend,

    /// Public URL under which the images directory is served (graph backend)
    #[arg(long, value_name = "URL")]
    pub public_base_url: Option<String>,

    /// Where the direct backend caches its login session
    #[arg(long, default_value = ".ig_session.json")]
    pub session_file: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Include debug output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Container-based Graph API
    Graph,
    /// Session login and direct photo upload
    Direct,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}
