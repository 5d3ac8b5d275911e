// Error types for a download session

use thiserror::Error;

/// Exit code reported when the child was terminated without one (killed by a signal).
pub const NO_EXIT_CODE: i32 = -1;

/// Terminal failure of a download session.
///
/// A format-unavailable outcome never shows up here: the policy recovers from
/// it by moving down the ladder. Everything else ends the session.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp could not be located or launched
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Quality label outside the supported vocabulary
    #[error("Unsupported quality label: {0}")]
    InvalidQuality(String),

    /// A rung failed for a reason other than an unavailable format
    #[error("yt-dlp exited with code {exit_code} on rung {rank} ({selector})")]
    NonFormatFailure {
        exit_code: i32,
        rank: usize,
        selector: String,
    },

    /// Every rung, including the terminal auto rung, failed
    #[error("No format could be downloaded; last rung {rank} ({selector}) exited with code {exit_code}")]
    LadderExhausted {
        exit_code: i32,
        rank: usize,
        selector: String,
    },

    /// The session was cancelled while rung `rank` was running
    #[error("Download cancelled on rung {rank}")]
    Cancelled { rank: usize },

    /// Failed to read settings
    #[error("Settings error: {0}")]
    Settings(String),

    /// Process or filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to run a single rung to completion
#[derive(Debug, Error)]
pub enum RunError {
    /// The executable could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Cancellation fired while the child was running
    #[error("Cancelled")]
    Cancelled,

    /// Reading output or waiting for the child failed
    #[error("Process error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Last exit code observed from yt-dlp, if the session got that far.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonFormatFailure { exit_code, .. } | Self::LadderExhausted { exit_code, .. } => {
                Some(*exit_code)
            }
            Self::Cancelled { .. } => Some(NO_EXIT_CODE),
            _ => None,
        }
    }

    /// Rank of the last rung that was launched.
    pub fn last_rank(&self) -> Option<usize> {
        match self {
            Self::NonFormatFailure { rank, .. }
            | Self::LadderExhausted { rank, .. }
            | Self::Cancelled { rank } => Some(*rank),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_is_carried() {
        let err = DownloadError::LadderExhausted {
            exit_code: 2,
            rank: 5,
            selector: "bestvideo+bestaudio".to_string(),
        };
        assert_eq!(err.exit_code(), Some(2));
        assert_eq!(err.last_rank(), Some(5));
        assert!(err.to_string().contains("bestvideo+bestaudio"));
    }

    #[test]
    fn test_tool_not_found_has_no_exit_code() {
        let err = DownloadError::ToolNotFound("yt-dlp".to_string());
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.last_rank(), None);
    }
}
