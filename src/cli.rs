use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser)]
#[command(
    name = "vidtutor",
    about = "Fetch a YouTube transcript with chapters and metadata",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Output format: json (default), text
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the yt-dlp metadata lookup
    #[arg(long)]
    pub no_metadata: bool,

    /// Metadata lookup timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show selected transcript type and metadata summary
    #[arg(short, long)]
    pub verbose: bool,
}
