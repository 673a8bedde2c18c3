use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::Command;

use clap::ValueEnum;
use eyre::{Result, bail};
use log::{debug, info};

use vidtutor::config::Config;
use vidtutor::metadata::{MetadataSource, YtDlp};
use vidtutor::output;
use vidtutor::youtube::YouTubeClient;

mod cli;

use cli::{Cli, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("vidtutor.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidtutor")
        .join("logs")
}

fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn build_after_help() -> String {
    let yt_dlp = tool_version("yt-dlp");

    let yt_dlp_line = match &yt_dlp {
        Some(v) => format!("  \x1b[32m✅\x1b[0m yt-dlp     {v}"),
        None => "  \x1b[31m❌\x1b[0m yt-dlp     (not found, titles/chapters/metadata will be empty)".to_string(),
    };

    let log_path = log_dir().join("vidtutor.log");

    format!(
        "\nOPTIONAL TOOLS:\n{yt_dlp_line}\n\nLogs are written to: {}",
        log_path.display()
    )
}

/// URL from the argument, or the first non-empty line of stdin
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(ref url) = cli.url {
        return Ok(url.trim().to_string());
    }
    for line in io::stdin().lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            return Ok(line.trim().to_string());
        }
    }
    bail!("no URL or video ID provided\n\nUsage: vidtutor <URL>\n       echo <URL> | vidtutor");
}

fn emit(cli: &Cli, rendered: &str) -> Result<()> {
    if let Some(ref path) = cli.output {
        std::fs::write(path, rendered)?;
        if cli.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    // CLI flags take priority over config
    let format = cli
        .format
        .or_else(|| {
            config
                .default_format
                .as_deref()
                .and_then(|f| OutputFormat::from_str(f, true).ok())
        })
        .unwrap_or(OutputFormat::Json);
    let timeout = cli
        .timeout
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.metadata_timeout());
    let skip_metadata = cli.no_metadata || config.skip_metadata.unwrap_or(false);

    if cli.verbose {
        let config_path = vidtutor::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }
    debug!("format={format:?} timeout={timeout:?} skip_metadata={skip_metadata}");

    let input = read_input(&cli)?;

    let service = YouTubeClient::new(reqwest::Client::new());
    let ytdlp = YtDlp::new(config.yt_dlp(), timeout);
    let metadata: Option<&dyn MetadataSource> = if skip_metadata { None } else { Some(&ytdlp) };

    match vidtutor::get_transcript(&input, &service, metadata).await {
        Ok(result) => {
            if cli.verbose {
                eprintln!(
                    "Video: {} ({})\nTranscript type: {}\nEntries: {}\nChapters: {}",
                    result.title,
                    result.video_id,
                    result.metadata.transcript_type,
                    result.entries.len(),
                    result.chapters.len(),
                );
            }

            let rendered = match format {
                OutputFormat::Json => output::render_json(&result)?,
                OutputFormat::Text => output::render_text(&result),
            };
            emit(&cli, &rendered)?;
            Ok(())
        }
        Err(e) => {
            match format {
                OutputFormat::Json => emit(&cli, &output::render_error_json(&e.to_string())?)?,
                OutputFormat::Text => eprintln!("Error: {e}"),
            }
            if e.is_client_error() {
                eprintln!(
                    "\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/v/ID\n  <11-character video ID>"
                );
            }
            std::process::exit(e.exit_code());
        }
    }
}
