// FormatSelector - quality ladder construction
//
// Turns a parsed quality label into the ordered list of yt-dlp `-f`
// expressions tried by the orchestrator:
// - Audio: capped bitrate first, then unconstrained best audio
// - Video: standard heights at or below the request, then an "auto" rung

use super::models::{AttemptKind, FormatAttempt, Quality};

/// Standard heights, highest first
pub const STANDARD_HEIGHTS: [u32; 5] = [1080, 720, 480, 360, 240];

/// Audio bitrate ceiling paired with video rungs (kbps)
pub const VIDEO_AUDIO_ABR: u32 = 128;

/// Height used by the low-resolution fallback inside the first audio rung
const AUDIO_FALLBACK_HEIGHT: u32 = 240;

pub struct FormatSelector;

impl FormatSelector {
    /// Build the full ladder for a quality target.
    pub fn build_ladder(quality: Quality) -> Vec<FormatAttempt> {
        let selectors: Vec<(String, bool)> = match quality {
            Quality::Audio { max_abr } => vec![
                (Self::capped_audio_spec(max_abr), false),
                ("bestaudio".to_string(), false),
            ],
            Quality::Video { max_height } => {
                let mut rungs: Vec<(String, bool)> = Self::ladder_heights(max_height)
                    .into_iter()
                    .map(|h| (Self::capped_video_spec(h), false))
                    .collect();
                rungs.push((Self::auto_video_spec(), true));
                rungs
            }
        };

        let kind = if quality.is_audio() {
            AttemptKind::Audio
        } else {
            AttemptKind::Video
        };

        selectors
            .into_iter()
            .enumerate()
            .map(|(idx, (format_selector, is_fallback_auto))| FormatAttempt {
                format_selector,
                rank: idx + 1,
                is_fallback_auto,
                kind,
            })
            .collect()
    }

    /// Standard heights not above `max_height`; all of them when the request
    /// is below the lowest rung or uncapped.
    pub fn ladder_heights(max_height: Option<u32>) -> Vec<u32> {
        let Some(max) = max_height else {
            return STANDARD_HEIGHTS.to_vec();
        };

        let filtered: Vec<u32> = STANDARD_HEIGHTS
            .iter()
            .copied()
            .filter(|h| *h <= max)
            .collect();

        if filtered.is_empty() {
            STANDARD_HEIGHTS.to_vec()
        } else {
            filtered
        }
    }

    fn capped_audio_spec(max_abr: u32) -> String {
        format!(
            "bestaudio[abr<={}]/best[height<={}]",
            max_abr, AUDIO_FALLBACK_HEIGHT
        )
    }

    fn capped_video_spec(height: u32) -> String {
        format!(
            "bestvideo[height<={h}]+bestaudio[abr<={abr}]/best[height<={h}]",
            h = height,
            abr = VIDEO_AUDIO_ABR
        )
    }

    fn auto_video_spec() -> String {
        "bestvideo+bestaudio".to_string()
    }
}
