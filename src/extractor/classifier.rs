//! URL classification
//!
//! Maps a raw URL onto the platform family whose strategy chain should run.
//! Pure and total: unparsable or unknown URLs fall back to the general family.

use reqwest::Url;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformFamily {
    /// Short-video platform that actively blocks automated retrieval
    RestrictedShortVideo,
    /// Everything else, handled by the general-purpose extractor
    General,
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RestrictedShortVideo => write!(f, "restricted-short-video"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Host-based classifier over a fixed domain set
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    restricted: Vec<String>,
}

impl UrlClassifier {
    pub fn new<I, S>(restricted_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let restricted = restricted_domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { restricted }
    }

    pub fn domains(&self) -> &[String] {
        &self.restricted
    }

    pub fn classify(&self, url: &str) -> PlatformFamily {
        match host_of(url) {
            Some(host) if self.restricted.iter().any(|d| host_matches(&host, d)) => {
                PlatformFamily::RestrictedShortVideo
            }
            _ => PlatformFamily::General,
        }
    }
}

/// Lowercased host of `url`, if it parses and has one
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.');
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

/// Exact or dot-suffix match; both sides already lowercase
pub fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
