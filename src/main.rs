//! yt-fallback CLI
//!
//! Usage:
//!   yt-fallback download <URL> -q 720p     - Download, degrading quality if needed
//!   yt-fallback ladder -q 仅音频64k          - Show the format selectors that would be tried
//!   yt-fallback tools                      - Show where yt-dlp / ffmpeg were found

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use youtube_fallback_lib::downloader::{
    parse_ytdlp_progress, DownloadError, DownloadRequest, FormatSelector, Quality, Settings, ToolLocator, ToolType,
};
use youtube_fallback_lib::{system_downloader, CancelHandle};

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "yt-fallback";

#[derive(Parser)]
#[command(name = "yt-fallback")]
#[command(about = "Download videos with yt-dlp, falling back to lower quality when needed")]
#[command(version)]
struct Cli {
    /// Settings file (JSON). Defaults to ./settings.json, then the user config dir
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download one URL
    Download {
        url: String,

        /// Quality label: 1080p, 720p, 480p, 360p, 240p, best, 仅音频, 仅音频64k
        #[arg(short, long, default_value = "720p")]
        quality: String,

        /// Override the storage directory from settings
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print raw yt-dlp output instead of parsed progress
        #[arg(long)]
        raw: bool,
    },

    /// Print the fallback ladder for a quality label
    Ladder {
        #[arg(short, long)]
        quality: String,
    },

    /// Show where yt-dlp and ffmpeg were found
    Tools,
}

fn default_settings_path() -> PathBuf {
    let local = PathBuf::from(SETTINGS_FILE);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
        .unwrap_or(local)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings_path = cli.settings.unwrap_or_else(default_settings_path);

    match cli.command {
        Commands::Download {
            url,
            quality,
            output,
            raw,
        } => {
            let mut settings = Settings::load(&settings_path)
                .with_context(|| format!("loading {}", settings_path.display()))?;
            if let Some(dir) = output {
                settings.storage_dir = dir;
            }

            let cancel = CancelHandle::new();
            let downloader = system_downloader(&settings).with_cancel_token(cancel.token());

            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("Cancelling...");
                    cancel.cancel();
                }
            });

            let mut sink = |line: &str| {
                if raw {
                    println!("{}", line);
                } else if let Some(progress) = parse_ytdlp_progress(line) {
                    println!("{}", progress.status);
                } else if line.starts_with("⚠️") || line.contains("ERROR") {
                    println!("{}", line);
                }
            };

            let request = DownloadRequest::new(url, quality);
            match downloader.download(&request, &mut sink).await {
                Ok(report) => {
                    println!(
                        "✅ Downloaded with {} (attempt {})",
                        report.attempt.format_selector, report.attempts_made
                    );
                    Ok(())
                }
                Err(err @ DownloadError::ToolNotFound(_)) => {
                    Err(err).context("install yt-dlp or place it next to this binary")
                }
                Err(err) => {
                    let code = err.exit_code().unwrap_or(1);
                    eprintln!("❌ {}", err);
                    std::process::exit(if code > 0 { code } else { 1 });
                }
            }
        }

        Commands::Ladder { quality } => {
            let quality = Quality::parse(&quality)?;
            for attempt in FormatSelector::build_ladder(quality) {
                let marker = if attempt.is_fallback_auto { " (auto)" } else { "" };
                println!("{}. {}{}", attempt.rank, attempt.format_selector, marker);
            }
            Ok(())
        }

        Commands::Tools => {
            let locator = ToolLocator::from_env();
            for tool in [ToolType::YtDlp, ToolType::Ffmpeg] {
                let location = locator.locate_tool(tool);
                let state = if location.is_found() { "found" } else { "not found" };
                println!("{:<8} {} ({})", tool.as_str(), location.path().display(), state);
            }
            Ok(())
        }
    }
}
