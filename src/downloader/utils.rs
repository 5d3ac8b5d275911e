// Helper functions for building yt-dlp invocations

use std::path::Path;
use url::{ParseError, Url};

use super::models::{AttemptKind, DownloadRequest, FormatAttempt, ToolPaths};
use super::settings::ProxyConfig;

/// Hosts whose downloads go through the configured proxy
pub const PROXY_REQUIRED_DOMAINS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Proxy URL schemes yt-dlp is given
pub const ACCEPTED_PROXY_SCHEMES: [&str; 3] = ["http", "https", "socks5"];

/// yt-dlp output template, relative to the storage directory
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

pub const SOCKET_TIMEOUT_SECS: u32 = 60;
pub const RETRIES: u32 = 10;
pub const FRAGMENT_RETRIES: u32 = 10;
pub const CONCURRENT_FRAGMENTS: u32 = 4;

/// Whether the URL's host is one of the proxy-required sites (or a subdomain).
pub fn requires_proxy(url: &str) -> bool {
    let trimmed = url.trim();
    // yt-dlp accepts "www.youtube.com/watch?v=..." without a scheme
    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => {
            match Url::parse(&format!("https://{}", trimmed)) {
                Ok(parsed) => parsed,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();

    PROXY_REQUIRED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

/// Whether the proxy address uses a scheme yt-dlp is handed.
pub fn is_accepted_proxy(address: &str) -> bool {
    match Url::parse(address) {
        Ok(parsed) => ACCEPTED_PROXY_SCHEMES.contains(&parsed.scheme()),
        Err(_) => false,
    }
}

/// Build proxy arguments for yt-dlp
pub fn get_proxy_args(url: &str, proxy: &ProxyConfig) -> Vec<String> {
    if !requires_proxy(url) || proxy.mode.is_disabled() {
        return Vec::new();
    }

    match proxy.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() && is_accepted_proxy(address) => {
            vec!["--proxy".to_string(), address.to_string()]
        }
        Some(address) if !address.is_empty() => {
            log::warn!(
                "[downloader] Ignoring proxy with unsupported scheme: {}",
                address
            );
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Fixed network robustness arguments
pub fn get_robustness_args() -> Vec<String> {
    vec![
        "--socket-timeout".to_string(),
        SOCKET_TIMEOUT_SECS.to_string(),
        "--retries".to_string(),
        RETRIES.to_string(),
        "--fragment-retries".to_string(),
        FRAGMENT_RETRIES.to_string(),
        "--concurrent-fragments".to_string(),
        CONCURRENT_FRAGMENTS.to_string(),
    ]
}

/// Full argument list for one rung
pub fn build_args(
    request: &DownloadRequest,
    attempt: &FormatAttempt,
    storage_dir: &Path,
    tools: &ToolPaths,
    proxy: &ProxyConfig,
) -> Vec<String> {
    let mut args = vec!["-f".to_string(), attempt.format_selector.clone()];

    match attempt.kind {
        AttemptKind::Audio => args.extend([
            "-x".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
        ]),
        AttemptKind::Video => args.extend([
            "--merge-output-format".to_string(),
            "mp4".to_string(),
        ]),
    }

    args.push("-o".to_string());
    args.push(storage_dir.join(OUTPUT_TEMPLATE).to_string_lossy().to_string());

    if let Some(mux) = &tools.mux_helper {
        args.push("--ffmpeg-location".to_string());
        args.push(mux.to_string_lossy().to_string());
    }

    args.push("--newline".to_string());
    args.extend(get_robustness_args());
    args.extend(get_proxy_args(request.url(), proxy));
    args.push(request.url().to_string());
    args
}
