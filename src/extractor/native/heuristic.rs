use crate::extractor::models::{Payload, SourceTag};
use crate::extractor::traits::Strategy;
use crate::utils::error::{ExtractError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;
use tracing::info;

/// Last-resort strategy that only reads the video id out of the URL
///
/// Produces a metadata-only record with no formats. Off by default since a
/// success here ends the chain.
pub struct UrlHeuristicStrategy;

fn id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"tiktok\.com/@[^/]+/video/(\d+)",
            r"tiktok\.com/.*?video/(\d+)",
            r"vm\.tiktok\.com/(\w+)",
            r"vt\.tiktok\.com/(\w+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

/// Video id (or short-link code) embedded in `url`
pub fn extract_video_id(url: &str) -> Option<String> {
    id_patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[async_trait]
impl Strategy for UrlHeuristicStrategy {
    fn name(&self) -> &str {
        "URL heuristic"
    }

    fn supports(&self, url: &str) -> bool {
        extract_video_id(url).is_some()
    }

    async fn fetch(&self, url: &str, _download: bool) -> Result<Payload> {
        let id = extract_video_id(url)
            .ok_or_else(|| ExtractError::InvalidUrl(url.to_string()))?;
        info!("Falling back to URL-only metadata for video {}", id);
        Ok(Payload::new(
            SourceTag::UrlHeuristic,
            Some(url.to_string()),
            json!({ "video_id": id }),
        ))
    }
}
