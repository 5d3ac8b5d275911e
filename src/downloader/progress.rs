// Progress line parsing for display
//
// Lines reach the sink verbatim; this is only used by front ends that want a
// percentage out of them.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parsed download progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}

lazy_static::lazy_static! {
    static ref PROGRESS_RE: Regex = Regex::new(
        r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+(?:\s*\w+/s)?))?(?:\s+ETA\s+(\S+))?(?:\s+\(frag\s+(\d+)/(\d+)\))?"
    ).expect("valid progress regex");
    static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").expect("valid destination regex");
    static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").expect("valid merge regex");
    static ref EXTRACT_RE: Regex = Regex::new(r"\[ExtractAudio\]\s+Destination").expect("valid extract regex");
    static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").expect("valid regex");
}

/// Parse a yt-dlp line like:
/// `[download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)`
pub fn parse_ytdlp_progress(line: &str) -> Option<DownloadProgress> {
    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let speed = caps.get(3).map(|m| m.as_str()).unwrap_or("?");
        let eta = caps.get(4).map(|m| m.as_str());
        let frag = caps.get(5).zip(caps.get(6)).map(|(c, t)| (c.as_str(), t.as_str()));

        let mut status = format!("⬇️ {:.1}% of {} @ {}", percent, size, speed);
        if let Some(eta) = eta {
            status.push_str(&format!(" ETA {}", eta));
        }
        if let Some((current, total)) = frag {
            status.push_str(&format!(" (frag {}/{})", current, total));
        }

        return Some(DownloadProgress { percent, status });
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .chars()
            .take(50)
            .collect();
        return Some(DownloadProgress {
            percent: 0.0,
            status: format!("📥 Starting: {}...", short_name),
        });
    }

    if MERGE_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 99.0,
            status: "🔄 Merging video and audio...".to_string(),
        });
    }

    if EXTRACT_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 99.0,
            status: "🎵 Converting audio...".to_string(),
        });
    }

    if ALREADY_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: 100.0,
            status: "✅ File already downloaded".to_string(),
        });
    }

    None
}
