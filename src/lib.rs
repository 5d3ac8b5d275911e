pub mod downloader;

use downloader::{
    DownloadError, DownloadReport, DownloadRequest, Downloader, ProgressSink, Settings,
    TokioProcessRunner, ToolLocator,
};

pub use downloader::{CancelHandle, CancelToken};

/// Downloader wired to the real environment: tools from PATH or next to the
/// binary, yt-dlp launched through tokio.
pub fn system_downloader(settings: &Settings) -> Downloader<TokioProcessRunner> {
    let tools = ToolLocator::from_env().resolve_tools();
    log::info!(
        "[tools] yt-dlp: {}, ffmpeg: {}",
        tools.downloader_executable.display(),
        tools
            .mux_helper
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not found".to_string())
    );
    Downloader::new(TokioProcessRunner::new(), tools, settings)
}

/// Download `url` at `quality` with the given settings.
pub async fn download(
    url: &str,
    quality: &str,
    settings: &Settings,
    sink: &mut dyn ProgressSink,
) -> Result<DownloadReport, DownloadError> {
    let request = DownloadRequest::new(url, quality);
    system_downloader(settings).download(&request, sink).await
}
