// Outcome diagnostics - classifies a finished yt-dlp run
//
// Lines are observed as they stream past; the verdict is only produced once
// the exit code is known.

use super::models::AttemptOutcome;

/// Marker yt-dlp prefixes fatal messages with
pub const ERROR_MARKER: &str = "ERROR";

/// Phrase yt-dlp uses when no stream matches the `-f` expression (lowercased)
pub const FORMAT_UNAVAILABLE_PHRASE: &str = "requested format is not available";

/// Whether a single output line carries the format-unavailable signature.
pub fn is_format_unavailable_line(line: &str) -> bool {
    line.contains(ERROR_MARKER) && line.to_lowercase().contains(FORMAT_UNAVAILABLE_PHRASE)
}

/// Accumulates what was seen during one run
#[derive(Debug, Default, Clone)]
pub struct OutcomeClassifier {
    saw_format_unavailable: bool,
    lines_seen: usize,
}

impl OutcomeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, line: &str) {
        self.lines_seen += 1;
        if !self.saw_format_unavailable && is_format_unavailable_line(line) {
            self.saw_format_unavailable = true;
        }
    }

    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    pub fn finish(self, exit_code: i32) -> AttemptOutcome {
        AttemptOutcome {
            exit_code,
            saw_format_unavailable_error: self.saw_format_unavailable,
        }
    }
}
