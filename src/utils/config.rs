//! Extractor configuration

use crate::utils::error::{ExtractError, Result};
use crate::utils::platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Process-wide, read-only extractor settings
///
/// Loaded once at startup and shared across requests behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Hosts (and their subdomains) that get the restricted-platform chain
    pub restricted_domains: Vec<String>,

    /// Hosts whose URLs are redirect-style short links
    pub short_link_hosts: Vec<String>,

    /// Fragments in a resolved URL that mean "video not found"
    pub not_found_markers: Vec<String>,

    /// Mirrors of the primary metadata API, tried in order
    pub api_endpoints: Vec<String>,

    /// Host prefixed to relative media paths returned by the primary API
    pub api_media_base: String,

    pub savett_url: String,
    pub snaptik_url: String,
    pub tikmate_url: String,

    /// Timeout for short-link resolution (ms)
    pub resolve_timeout_ms: u64,

    /// Timeout per API endpoint or fallback service call (ms)
    pub request_timeout_ms: u64,

    /// Upper bound for one yt-dlp invocation (ms)
    pub ytdlp_timeout_ms: u64,

    /// Explicit yt-dlp binary; discovered automatically when unset
    pub ytdlp_path: Option<PathBuf>,

    /// Where yt-dlp writes files when download intent is set
    pub download_dir: PathBuf,

    /// Append the URL-only heuristic to the restricted chain
    pub metadata_only_fallback: bool,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            restricted_domains: vec!["tiktok.com".to_string()],
            short_link_hosts: vec!["vm.tiktok.com".to_string(), "vt.tiktok.com".to_string()],
            not_found_markers: vec!["notfound".to_string()],
            api_endpoints: vec![
                "https://www.tikwm.com/api/".to_string(),
                "https://api.tikwm.com/api/".to_string(),
                "https://tikwm.com/api/".to_string(),
                "https://tikwm.online/api/".to_string(),
                "https://api16.tikwm.com/api/".to_string(),
            ],
            api_media_base: "https://www.tikwm.com".to_string(),
            savett_url: "https://savett.cc/api/ajaxSearch".to_string(),
            snaptik_url: "https://snaptik.app/abc2.php".to_string(),
            tikmate_url: "https://tikmate.online/download".to_string(),
            resolve_timeout_ms: 10_000,
            request_timeout_ms: 15_000,
            ytdlp_timeout_ms: 120_000,
            ytdlp_path: None,
            download_dir: dirs::download_dir()
                .unwrap_or_else(|| PathBuf::from("./downloads"))
                .join("clipfetch"),
            metadata_only_fallback: false,
        }
    }
}

impl ExtractorSettings {
    /// Load settings from a TOML file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&raw)
            .map_err(|e| ExtractError::Config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path` if given, else from the user config file if present,
    /// else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let default_path = platform::config_file();
        if default_path.exists() {
            return Self::from_file(&default_path);
        }

        debug!(
            "No config file at {}, using defaults",
            default_path.display()
        );
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_endpoints.is_empty() {
            return Err(ExtractError::Config(
                "api_endpoints must list at least one endpoint".to_string(),
            ));
        }
        if self.resolve_timeout_ms == 0 || self.request_timeout_ms == 0 || self.ytdlp_timeout_ms == 0 {
            return Err(ExtractError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn ytdlp_timeout(&self) -> Duration {
        Duration::from_millis(self.ytdlp_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExtractorSettings::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_endpoints.len(), 5);
        assert_eq!(config.api_endpoints[0], "https://www.tikwm.com/api/");
        assert!(!config.metadata_only_fallback);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_ms = 2500").unwrap();
        writeln!(file, "metadata_only_fallback = true").unwrap();

        let config = ExtractorSettings::from_file(file.path()).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        assert!(config.metadata_only_fallback);
        assert_eq!(config.restricted_domains, vec!["tiktok.com".to_string()]);
    }

    #[test]
    fn empty_endpoint_list_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_endpoints = []").unwrap();

        let err = ExtractorSettings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_ms = \"soon\"").unwrap();

        let err = ExtractorSettings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }
}
