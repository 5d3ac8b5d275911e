// Settings loaded from a JSON file

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::errors::DownloadError;

/// Storage folder used when the settings don't name one
pub const DEFAULT_STORAGE_DIR: &str = "YT";

/// Proxy mode from settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProxyMode {
    /// Use the proxy for sites that need it
    #[default]
    Auto,
    /// Never use a proxy
    None,
    /// Any other value; behaves like `Auto`
    Other(String),
}

impl ProxyMode {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<String> for ProxyMode {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "auto" => Self::Auto,
            "none" => Self::None,
            _ => Self::Other(s),
        }
    }
}

impl From<ProxyMode> for String {
    fn from(mode: ProxyMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for ProxyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::None => write!(f, "none"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Proxy configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProxyConfig {
    pub mode: ProxyMode,
    /// Proxy URL, e.g. "socks5://127.0.0.1:1080"
    pub address: Option<String>,
}

impl ProxyConfig {
    pub fn new(mode: ProxyMode, address: Option<String>) -> Self {
        Self { mode, address }
    }
}

/// Settings file contents. Keys from the original settings file are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "存储位置")]
    pub storage_dir: PathBuf,

    #[serde(alias = "代理模式")]
    pub proxy_mode: ProxyMode,

    #[serde(alias = "代理地址")]
    pub proxy_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            proxy_mode: ProxyMode::Auto,
            proxy_address: String::new(),
        }
    }
}

impl Settings {
    /// Load settings; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, DownloadError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "[settings] {} not found, using defaults",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(DownloadError::Settings(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Self::from_json(&content)
            .map_err(|e| DownloadError::Settings(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn proxy(&self) -> ProxyConfig {
        let address = self.proxy_address.trim();
        ProxyConfig {
            mode: self.proxy_mode.clone(),
            address: (!address.is_empty()).then(|| address.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_for_missing_keys() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings.storage_dir, PathBuf::from("YT"));
        assert_eq!(settings.proxy_mode, ProxyMode::Auto);
        assert_eq!(settings.proxy().address, None);
    }

    #[test]
    fn test_original_key_aliases() {
        let json = r#"{"存储位置": "downloads", "代理模式": "none", "代理地址": "http://127.0.0.1:7890"}"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.storage_dir, PathBuf::from("downloads"));
        assert!(settings.proxy_mode.is_disabled());
        assert_eq!(
            settings.proxy().address.as_deref(),
            Some("http://127.0.0.1:7890")
        );
    }

    #[test]
    fn test_proxy_mode_parsing() {
        assert_eq!(ProxyMode::from("NONE".to_string()), ProxyMode::None);
        assert_eq!(ProxyMode::from("Auto".to_string()), ProxyMode::Auto);
        assert_eq!(
            ProxyMode::from("manual".to_string()),
            ProxyMode::Other("manual".to_string())
        );
        assert!(!ProxyMode::Other("manual".to_string()).is_disabled());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, DownloadError::Settings(_)));
    }

    #[test]
    fn test_blank_address_is_none() {
        let settings = Settings {
            proxy_address: "   ".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.proxy().address, None);
    }
}
