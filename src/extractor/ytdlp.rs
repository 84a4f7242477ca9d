//! yt-dlp wrapper for general-purpose extraction
//!
//! yt-dlp is consumed as an opaque capability: one subprocess per attempt,
//! `--dump-json` output parsed into a [`SourceTag::YtDlp`] payload. Client
//! identities come from [`profiles`](crate::extractor::profiles).

use crate::extractor::models::{Payload, SourceTag};
use crate::extractor::profiles::ClientProfile;
use crate::extractor::traits::{Attempt, Strategy};
use crate::utils::error::{ExtractError, Result};
use crate::utils::platform;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// One yt-dlp invocation under one client identity
#[derive(Debug, Clone)]
pub struct YtDlpStrategy {
    name: String,
    ytdlp_path: Option<PathBuf>,
    profile: ClientProfile,
    timeout: Duration,
    download_dir: PathBuf,
}

impl YtDlpStrategy {
    pub fn new(
        name: impl Into<String>,
        ytdlp_path: Option<PathBuf>,
        profile: ClientProfile,
        timeout: Duration,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            ytdlp_path,
            profile,
            timeout,
            download_dir,
        }
    }

    pub fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    /// Arguments passed to yt-dlp for `url`
    pub fn build_args(&self, url: &str, download: bool) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
        ];
        args.extend(self.profile.ytdlp_args());
        if download {
            args.push("--no-simulate".to_string());
            args.push("-P".to_string());
            args.push(self.download_dir.to_string_lossy().into_owned());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl Strategy for YtDlpStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _url: &str) -> bool {
        self.ytdlp_path.is_some()
    }

    async fn fetch(&self, url: &str, download: bool) -> Result<Payload> {
        let ytdlp_path = self.ytdlp_path.as_ref().ok_or(ExtractError::YtDlpNotFound)?;
        debug!("Extracting video info with yt-dlp ({}) for URL: {}", self.profile.name, url);

        let mut command = AsyncCommand::new(ytdlp_path);
        command.args(self.build_args(url, download)).kill_on_drop(true);

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| ExtractError::Timeout(format!("yt-dlp after {:?}", self.timeout)))??;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            error!("yt-dlp extraction failed: {}", error_msg.trim());
            return Err(ExtractError::ExtractionError(error_msg.trim().to_string()));
        }

        parse_info_json(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Turn `--dump-json` output into a payload
///
/// The first non-empty line is the info dict for the requested item.
pub fn parse_info_json(stdout: &str) -> Result<Payload> {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| ExtractError::ExtractionError("yt-dlp printed no metadata".to_string()))?;

    let body: Value = serde_json::from_str(line)?;
    let webpage_url = ["webpage_url", "original_url"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(Payload::new(SourceTag::YtDlp, webpage_url, body))
}

/// Legacy cascade: several yt-dlp identities behind one strategy name
pub struct ProfileCascade {
    name: String,
    steps: Vec<Arc<YtDlpStrategy>>,
}

impl ProfileCascade {
    pub fn new(name: impl Into<String>, steps: Vec<Arc<YtDlpStrategy>>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}

#[async_trait]
impl Strategy for ProfileCascade {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, url: &str) -> bool {
        self.steps.iter().any(|s| s.supports(url))
    }

    async fn fetch(&self, url: &str, download: bool) -> Result<Payload> {
        for (i, step) in self.steps.iter().enumerate() {
            info!("{}: trying method {} ({})", self.name, i + 1, step.profile().name);
            match step.attempt(url, download).await {
                Attempt::Success(payload) => return Ok(payload),
                Attempt::Failure(reason) => {
                    warn!("{}: method {} failed: {}", self.name, i + 1, reason);
                }
                Attempt::NotApplicable => {}
            }
        }
        Err(ExtractError::ExtractionError(format!(
            "all {} methods failed",
            self.steps.len()
        )))
    }
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. Explicitly configured path
/// 2. Bundled (next to the executable / inside .app bundle)
/// 3. System PATH
/// 4. Common installation paths
pub fn find_ytdlp(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            info!("✓ Using configured yt-dlp: {:?}", path);
            return Some(path.to_path_buf());
        }
        warn!("Configured yt-dlp is not an executable file: {:?}", path);
    }

    if let Some(bundled) = platform::bundled_ytdlp() {
        info!("✓ Using bundled yt-dlp: {:?}", bundled);
        return Some(bundled);
    }

    if let Ok(system) = which::which("yt-dlp") {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

/// Find yt-dlp in common installation paths
fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // macOS Homebrew (Intel)
        "/usr/local/bin/yt-dlp",
        // System
        "/usr/bin/yt-dlp",
        // Python.org installation
        "/Library/Frameworks/Python.framework/Versions/Current/bin/yt-dlp",
        // User local
        "~/.local/bin/yt-dlp",
    ];

    common_paths.iter().find_map(|path_str| {
        let expanded = match path_str.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()?.join(rest),
            None => PathBuf::from(path_str),
        };
        is_executable(&expanded).then_some(expanded)
    })
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

// ============================================================
// Tests
// ============================================================
