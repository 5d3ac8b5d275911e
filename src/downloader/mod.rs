// Downloader module - yt-dlp orchestration with quality fallback

pub mod diagnostics;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod runner;
pub mod settings;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::{DownloadError, RunError};
pub use format_selector::FormatSelector;
pub use models::{
    AttemptKind, AttemptOutcome, DownloadReport, DownloadRequest, FormatAttempt, Quality,
    ToolPaths,
};
pub use orchestrator::Downloader;
pub use progress::{parse_ytdlp_progress, DownloadProgress};
pub use runner::TokioProcessRunner;
pub use settings::{ProxyConfig, ProxyMode, Settings};
pub use tools::{ToolLocation, ToolLocator, ToolType};
pub use traits::{CancelHandle, CancelToken, Invocation, ProcessRunner, ProgressSink};
