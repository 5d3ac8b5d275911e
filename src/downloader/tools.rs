// Tool locator - finds yt-dlp and ffmpeg
//
// Search order for each tool:
// 1. PATH entries
// 2. Next to our own executable (bundled copy)
// 3. Bare name, so the launch itself reports "not found"

use std::path::{Path, PathBuf};

use super::models::ToolPaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }
}

/// Where a tool was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLocation {
    SearchPath(PathBuf),
    Bundled(PathBuf),
    /// Not found; the bare name is used as-is
    BareName(PathBuf),
}

impl ToolLocation {
    pub fn path(&self) -> &Path {
        match self {
            Self::SearchPath(p) | Self::Bundled(p) | Self::BareName(p) => p,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Self::SearchPath(p) | Self::Bundled(p) | Self::BareName(p) => p,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Self::BareName(_))
    }
}

/// Platform-specific parts of tool lookup
pub trait Platform: Send + Sync {
    /// Suffix appended to executable names (".exe" on Windows)
    fn exe_suffix(&self) -> &'static str;

    /// Whether `path` is a runnable file
    fn is_executable(&self, path: &Path) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnixPlatform;

impl Platform for UnixPlatform {
    fn exe_suffix(&self) -> &'static str {
        ""
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsPlatform;

impl Platform for WindowsPlatform {
    fn exe_suffix(&self) -> &'static str {
        ".exe"
    }

    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Platform implementation for the current build target
pub fn current_platform() -> Box<dyn Platform> {
    if cfg!(windows) {
        Box::new(WindowsPlatform)
    } else {
        Box::new(UnixPlatform)
    }
}

pub struct ToolLocator {
    search_path: Vec<PathBuf>,
    install_dir: Option<PathBuf>,
    platform: Box<dyn Platform>,
}

impl ToolLocator {
    pub fn new(
        search_path: Vec<PathBuf>,
        install_dir: Option<PathBuf>,
        platform: Box<dyn Platform>,
    ) -> Self {
        Self {
            search_path,
            install_dir,
            platform,
        }
    }

    /// Locator over the process environment: `PATH` and the directory of the running binary.
    pub fn from_env() -> Self {
        let search_path = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        let install_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        Self::new(search_path, install_dir, current_platform())
    }

    fn file_name(&self, tool_name: &str) -> String {
        let suffix = self.platform.exe_suffix();
        if suffix.is_empty() || tool_name.to_lowercase().ends_with(suffix) {
            tool_name.to_string()
        } else {
            format!("{}{}", tool_name, suffix)
        }
    }

    pub fn locate(&self, tool_name: &str) -> ToolLocation {
        let file_name = self.file_name(tool_name);

        for dir in &self.search_path {
            let candidate = dir.join(&file_name);
            if self.platform.is_executable(&candidate) {
                log::debug!("[tools] {} found on PATH: {}", tool_name, candidate.display());
                return ToolLocation::SearchPath(candidate);
            }
        }

        if let Some(dir) = &self.install_dir {
            let candidate = dir.join(&file_name);
            if self.platform.is_executable(&candidate) {
                log::debug!("[tools] {} found next to app: {}", tool_name, candidate.display());
                return ToolLocation::Bundled(candidate);
            }
        }

        log::warn!("[tools] {} not found, falling back to bare name", tool_name);
        ToolLocation::BareName(PathBuf::from(tool_name))
    }

    pub fn locate_tool(&self, tool: ToolType) -> ToolLocation {
        self.locate(tool.as_str())
    }

    /// yt-dlp plus ffmpeg when one is actually present.
    pub fn resolve_tools(&self) -> ToolPaths {
        let downloader = self.locate_tool(ToolType::YtDlp);
        let mux = self.locate_tool(ToolType::Ffmpeg);

        ToolPaths::new(downloader.into_path())
            .with_mux_helper(mux.is_found().then(|| mux.into_path()))
    }
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Treats any existing file as executable
    struct FilePlatform(&'static str);

    impl Platform for FilePlatform {
        fn exe_suffix(&self) -> &'static str {
            self.0
        }

        fn is_executable(&self, path: &Path) -> bool {
            path.is_file()
        }
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_search_path_preferred_over_bundled() {
        let path_dir = tempfile::tempdir().unwrap();
        let app_dir = tempfile::tempdir().unwrap();
        let on_path = touch(path_dir.path(), "yt-dlp");
        touch(app_dir.path(), "yt-dlp");

        let locator = ToolLocator::new(
            vec![path_dir.path().to_path_buf()],
            Some(app_dir.path().to_path_buf()),
            Box::new(FilePlatform("")),
        );

        assert_eq!(locator.locate("yt-dlp"), ToolLocation::SearchPath(on_path));
    }

    #[test]
    fn test_bundled_copy_with_suffix() {
        let empty = tempfile::tempdir().unwrap();
        let app_dir = tempfile::tempdir().unwrap();
        let bundled = touch(app_dir.path(), "yt-dlp.exe");

        let locator = ToolLocator::new(
            vec![empty.path().to_path_buf()],
            Some(app_dir.path().to_path_buf()),
            Box::new(FilePlatform(".exe")),
        );

        assert_eq!(locator.locate("yt-dlp"), ToolLocation::Bundled(bundled));
    }

    #[test]
    fn test_bare_name_fallback() {
        let locator = ToolLocator::new(Vec::new(), None, Box::new(FilePlatform("")));
        let location = locator.locate("yt-dlp");
        assert!(!location.is_found());
        assert_eq!(location.path(), Path::new("yt-dlp"));
    }

    #[test]
    fn test_first_path_entry_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let expected = touch(first.path(), "ffmpeg");
        touch(second.path(), "ffmpeg");

        let locator = ToolLocator::new(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            None,
            Box::new(FilePlatform("")),
        );

        // Deterministic for a fixed environment
        assert_eq!(locator.locate("ffmpeg"), ToolLocation::SearchPath(expected.clone()));
        assert_eq!(locator.locate("ffmpeg"), ToolLocation::SearchPath(expected));
    }

    #[test]
    fn test_resolve_tools_skips_missing_mux() {
        let dir = tempfile::tempdir().unwrap();
        let ytdlp = touch(dir.path(), "yt-dlp");

        let locator = ToolLocator::new(
            vec![dir.path().to_path_buf()],
            None,
            Box::new(FilePlatform("")),
        );
        let tools = locator.resolve_tools();

        assert_eq!(tools.downloader_executable, ytdlp);
        assert_eq!(tools.mux_helper, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_requires_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "yt-dlp");
        assert!(!UnixPlatform.is_executable(&path));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(UnixPlatform.is_executable(&path));
    }
}
