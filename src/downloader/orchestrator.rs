// Orchestrator with quality fallback logic

use std::path::PathBuf;

use super::errors::{DownloadError, RunError, NO_EXIT_CODE};
use super::format_selector::FormatSelector;
use super::models::{DownloadReport, DownloadRequest, FormatAttempt, ToolPaths};
use super::settings::{ProxyConfig, Settings};
use super::traits::{CancelToken, Invocation, ProcessRunner, ProgressSink};
use super::utils;

/// Runs one download session, walking down the quality ladder on
/// format-unavailable failures.
pub struct Downloader<R: ProcessRunner> {
    runner: R,
    tools: ToolPaths,
    storage_dir: PathBuf,
    proxy: ProxyConfig,
    cancel: CancelToken,
}

impl<R: ProcessRunner> Downloader<R> {
    pub fn new(runner: R, tools: ToolPaths, settings: &Settings) -> Self {
        Self {
            runner,
            tools,
            storage_dir: settings.storage_dir.clone(),
            proxy: settings.proxy(),
            cancel: CancelToken::never(),
        }
    }

    /// Attach a cancellation token; firing it ends the session as a terminal failure.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// The argument list used for `attempt`.
    pub fn args_for(&self, request: &DownloadRequest, attempt: &FormatAttempt) -> Vec<String> {
        utils::build_args(request, attempt, &self.storage_dir, &self.tools, &self.proxy)
    }

    pub async fn download(
        &self,
        request: &DownloadRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<DownloadReport, DownloadError> {
        let quality = request.quality()?;
        let ladder = FormatSelector::build_ladder(quality);

        tokio::fs::create_dir_all(&self.storage_dir).await?;

        log::info!(
            "[downloader] {} at {} ({} rungs) via {}",
            request.url(),
            request.quality_label(),
            ladder.len(),
            self.runner.name()
        );

        let total = ladder.len();
        let mut previous: Option<FormatAttempt> = None;

        for (idx, attempt) in ladder.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(DownloadError::Cancelled { rank: attempt.rank });
            }

            if let Some(failed) = &previous {
                let notice = fallback_notice(failed, &attempt);
                log::info!("[downloader] {}", notice);
                sink.on_line(&notice);
            }

            let invocation = Invocation {
                program: self.tools.downloader_executable.clone(),
                args: self.args_for(request, &attempt),
                working_dir: None,
            };

            log::info!(
                "[downloader] Rung {}/{}: {}",
                attempt.rank,
                total,
                attempt.format_selector
            );

            let outcome = match self.runner.run(&invocation, sink, &self.cancel).await {
                Ok(outcome) => outcome,
                Err(RunError::Spawn { program, source })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    log::error!("[downloader] {} could not be launched: {}", program, source);
                    return Err(DownloadError::ToolNotFound(program));
                }
                Err(RunError::Spawn { source, .. }) => return Err(DownloadError::Io(source)),
                Err(RunError::Cancelled) => {
                    log::info!("[downloader] Cancelled during rung {}", attempt.rank);
                    return Err(DownloadError::Cancelled { rank: attempt.rank });
                }
                Err(RunError::Io(e)) => return Err(DownloadError::Io(e)),
            };

            if outcome.is_success() {
                log::info!("[downloader] ✓ Success with rung {}", attempt.rank);
                return Ok(DownloadReport {
                    attempt,
                    attempts_made: idx + 1,
                });
            }

            // Nothing left to fall back to
            if idx + 1 == total {
                log::warn!(
                    "[downloader] ✗ Last rung {} failed with exit code {}",
                    attempt.rank,
                    outcome.exit_code
                );
                return Err(DownloadError::LadderExhausted {
                    exit_code: outcome.exit_code,
                    rank: attempt.rank,
                    selector: attempt.format_selector,
                });
            }

            if !outcome.is_format_unavailable() {
                log::warn!(
                    "[downloader] ✗ Rung {} failed with exit code {}, not retrying",
                    attempt.rank,
                    outcome.exit_code
                );
                return Err(DownloadError::NonFormatFailure {
                    exit_code: outcome.exit_code,
                    rank: attempt.rank,
                    selector: attempt.format_selector,
                });
            }

            log::warn!(
                "[downloader] ✗ Rung {} format unavailable (exit code {})",
                attempt.rank,
                outcome.exit_code
            );
            previous = Some(attempt);
        }

        // Only reachable with an empty ladder
        Err(DownloadError::LadderExhausted {
            exit_code: NO_EXIT_CODE,
            rank: 0,
            selector: String::new(),
        })
    }
}

fn fallback_notice(failed: &FormatAttempt, next: &FormatAttempt) -> String {
    if next.is_fallback_auto {
        format!(
            "⚠️ Format {} not available, trying best available quality...",
            failed.format_selector
        )
    } else {
        format!(
            "⚠️ Format {} not available, falling back to {}...",
            failed.format_selector, next.format_selector
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::AttemptKind;

    fn attempt(selector: &str, auto: bool) -> FormatAttempt {
        FormatAttempt {
            format_selector: selector.to_string(),
            rank: 1,
            is_fallback_auto: auto,
            kind: AttemptKind::Video,
        }
    }

    #[test]
    fn test_fallback_notice_text() {
        let failed = attempt("a", false);
        assert!(fallback_notice(&failed, &attempt("b", false)).contains("falling back to b"));
        assert!(fallback_notice(&failed, &attempt("c", true)).contains("best available"));
    }
}
