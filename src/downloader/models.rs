// Common data models for the downloader

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::errors::DownloadError;

/// Label prefix used by the original settings UI for audio-only downloads.
pub const AUDIO_LABEL_PREFIX: &str = "仅音频";

/// One user action: download `url` at `quality_label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    url: String,
    quality_label: String,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, quality_label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality_label: quality_label.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn quality_label(&self) -> &str {
        &self.quality_label
    }

    /// Parse the quality label into a target.
    pub fn quality(&self) -> Result<Quality, DownloadError> {
        Quality::parse(&self.quality_label)
    }
}

/// Parsed quality label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Audio only, with a bitrate ceiling in kbps (64 or 128)
    Audio { max_abr: u32 },
    /// Video capped at `max_height` pixels; `None` means no cap ("best")
    Video { max_height: Option<u32> },
}

impl Quality {
    /// Accepts `仅音频…`/`audio…` (with an optional `64k` hint), `<height>p` and `best`.
    pub fn parse(label: &str) -> Result<Self, DownloadError> {
        let trimmed = label.trim();
        let lower = trimmed.to_lowercase();

        if trimmed.starts_with(AUDIO_LABEL_PREFIX) || lower.starts_with("audio") {
            let max_abr = if lower.contains("64k") { 64 } else { 128 };
            return Ok(Self::Audio { max_abr });
        }

        if lower == "best" {
            return Ok(Self::Video { max_height: None });
        }

        lower
            .strip_suffix('p')
            .and_then(|h| h.parse::<u32>().ok())
            .filter(|h| *h > 0)
            .map(|h| Self::Video {
                max_height: Some(h),
            })
            .ok_or_else(|| DownloadError::InvalidQuality(label.to_string()))
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio { .. })
    }
}

/// Whether a rung downloads audio (converted to mp3) or merged video (mp4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptKind {
    Audio,
    Video,
}

/// One rung of the quality ladder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatAttempt {
    /// yt-dlp `-f` expression
    pub format_selector: String,
    /// 1-based position in the ladder
    pub rank: usize,
    /// Terminal rung with no quality constraint
    pub is_fallback_auto: bool,
    pub kind: AttemptKind,
}

/// Result of one yt-dlp run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub exit_code: i32,
    pub saw_format_unavailable_error: bool,
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Non-zero exit caused by a missing format; the only retryable failure.
    pub fn is_format_unavailable(&self) -> bool {
        !self.is_success() && self.saw_format_unavailable_error
    }
}

/// Resolved executables for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub downloader_executable: PathBuf,
    /// ffmpeg location passed to `--ffmpeg-location`
    pub mux_helper: Option<PathBuf>,
}

impl ToolPaths {
    pub fn new(downloader_executable: impl Into<PathBuf>) -> Self {
        Self {
            downloader_executable: downloader_executable.into(),
            mux_helper: None,
        }
    }

    pub fn with_mux_helper(mut self, mux_helper: Option<PathBuf>) -> Self {
        self.mux_helper = mux_helper;
        self
    }
}

/// Successful session summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Rung that succeeded
    pub attempt: FormatAttempt,
    /// Number of yt-dlp runs in this session
    pub attempts_made: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_audio_labels() {
        assert_eq!(
            Quality::parse("仅音频64k").unwrap(),
            Quality::Audio { max_abr: 64 }
        );
        assert_eq!(
            Quality::parse("仅音频").unwrap(),
            Quality::Audio { max_abr: 128 }
        );
        assert_eq!(
            Quality::parse("Audio 64k").unwrap(),
            Quality::Audio { max_abr: 64 }
        );
        assert_eq!(
            Quality::parse("audio").unwrap(),
            Quality::Audio { max_abr: 128 }
        );
    }

    #[test]
    fn test_parse_video_labels() {
        assert_eq!(
            Quality::parse("720p").unwrap(),
            Quality::Video {
                max_height: Some(720)
            }
        );
        assert_eq!(
            Quality::parse("1440P").unwrap(),
            Quality::Video {
                max_height: Some(1440)
            }
        );
        assert_eq!(
            Quality::parse("best").unwrap(),
            Quality::Video { max_height: None }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_labels() {
        for label in ["", "p", "0p", "hd", "720", "-1p"] {
            assert!(
                matches!(Quality::parse(label), Err(DownloadError::InvalidQuality(_))),
                "label {:?} should be rejected",
                label
            );
        }
    }

    #[test]
    fn test_outcome_classification() {
        let failed = AttemptOutcome {
            exit_code: 1,
            saw_format_unavailable_error: true,
        };
        assert!(failed.is_format_unavailable());

        let odd = AttemptOutcome {
            exit_code: 0,
            saw_format_unavailable_error: true,
        };
        assert!(odd.is_success());
        assert!(!odd.is_format_unavailable());
    }
}
