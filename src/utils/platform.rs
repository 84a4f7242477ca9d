//! Platform-specific paths for clipfetch
//!
//! - Configuration directory and file
//! - Locations a bundled yt-dlp may live in

use std::path::PathBuf;

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/Clipfetch
/// - Windows: %APPDATA%\Clipfetch
/// - Linux: ~/.config/clipfetch
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipfetch")
    }

    #[cfg(not(target_os = "linux"))]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Clipfetch")
    }
}

/// Default settings file path
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// yt-dlp shipped alongside the executable (dev builds, bundles)
pub fn bundled_ytdlp() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;

    let adjacent = exe_dir.join(format!("yt-dlp{}", exe_extension()));
    if adjacent.is_file() {
        return Some(adjacent);
    }

    // Structure: App.app/Contents/MacOS/clipfetch
    // Resource:  App.app/Contents/Resources/bin/yt-dlp
    #[cfg(target_os = "macos")]
    {
        if exe_dir.ends_with("MacOS") {
            let bundle_path = exe_dir.parent()?.join("Resources").join("bin").join("yt-dlp");
            if bundle_path.is_file() {
                return Some(bundle_path);
            }
        }
    }

    None
}

/// Platform-specific executable extension
pub fn exe_extension() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        ".exe"
    }
    #[cfg(not(target_os = "windows"))]
    {
        ""
    }
}
