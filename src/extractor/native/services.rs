//! Third-party fallback services
//!
//! Wholly different download sites that are only consulted once every mirror
//! of the primary API has failed. Each has its own request shape and answers
//! in its own format, so each produces its own [`SourceTag`].

use super::request_error;
use super::tikwm::fix_media_paths;
use crate::extractor::models::{Payload, SourceTag};
use crate::extractor::profiles;
use crate::utils::error::{ExtractError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Response, Url};
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Most links taken from one TikMate or SnapTik page
const TIKMATE_MAX_LINKS: usize = 3;

/// Keys in SaveTT's `data` object that hold media or image paths
pub const SAVETT_MEDIA_KEYS: [&str; 4] = ["cover", "video", "video_hd", "audio"];

#[async_trait]
pub trait FallbackService: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> Result<Payload>;
}

async fn ok_body(response: Response, endpoint: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::HttpStatus {
            status: status.as_u16(),
            url: endpoint.to_string(),
        });
    }
    response.text().await.map_err(|e| request_error(e, endpoint))
}

/// SaveTT ajax search: JSON envelope with `status: "ok"`
#[derive(Debug, Clone)]
pub struct SaveTt {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl SaveTt {
    pub fn new(client: Client, endpoint: String, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }
}

#[async_trait]
impl FallbackService for SaveTt {
    fn name(&self) -> &'static str {
        "SaveTT"
    }

    async fn fetch(&self, url: &str) -> Result<Payload> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(profiles::AJAX_FORM.header_map())
            .form(&[("q", url), ("lang", "en")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, &self.endpoint))?;

        let text = ok_body(response, &self.endpoint).await?;
        let mut envelope: Value = serde_json::from_str(&text)?;

        if envelope.get("status").and_then(Value::as_str) != Some("ok") {
            return Err(ExtractError::Rejected(format!(
                "status {}",
                envelope.get("status").unwrap_or(&Value::Null)
            )));
        }

        let mut data = envelope.get_mut("data").map(Value::take).unwrap_or(Value::Null);
        if !data.is_object() {
            return Err(ExtractError::Rejected("missing data object".to_string()));
        }

        fix_media_paths(&service_origin(&self.endpoint), &mut data, &SAVETT_MEDIA_KEYS);

        Ok(Payload::new(SourceTag::SaveTt, Some(url.to_string()), data))
    }
}

/// SnapTik form endpoint; confirms the item exists, links when the page has them
#[derive(Debug, Clone)]
pub struct SnapTik {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl SnapTik {
    pub fn new(client: Client, endpoint: String, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }
}

#[async_trait]
impl FallbackService for SnapTik {
    fn name(&self) -> &'static str {
        "SnapTik"
    }

    async fn fetch(&self, url: &str) -> Result<Payload> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(profiles::MOBILE_SAFARI.header_map())
            .form(&[("url", url), ("token", ""), ("lang", "en")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, &self.endpoint))?;

        let text = ok_body(response, &self.endpoint).await?;
        if !has_download_control(&text) {
            return Err(ExtractError::Rejected("no download link or form in page".to_string()));
        }

        let links = extract_mp4_links(&text, TIKMATE_MAX_LINKS);
        debug!("SnapTik page carried {} video links", links.len());

        Ok(Payload::new(
            SourceTag::SnapTik,
            Some(url.to_string()),
            json!({ "links": links }),
        ))
    }
}

/// TikMate form endpoint: HTML page with `.mp4` anchors
#[derive(Debug, Clone)]
pub struct TikMate {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl TikMate {
    pub fn new(client: Client, endpoint: String, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }
}

#[async_trait]
impl FallbackService for TikMate {
    fn name(&self) -> &'static str {
        "TikMate"
    }

    async fn fetch(&self, url: &str) -> Result<Payload> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(profiles::MOBILE_SAFARI.header_map())
            .form(&[("url", url)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, &self.endpoint))?;

        let text = ok_body(response, &self.endpoint).await?;
        let links = extract_mp4_links(&text, TIKMATE_MAX_LINKS);
        debug!("TikMate page carried {} video links", links.len());

        Ok(Payload::new(
            SourceTag::TikMate,
            Some(url.to_string()),
            json!({ "links": links }),
        ))
    }
}

/// Scheme, host and port of a service endpoint, used as the base for its
/// relative media paths
pub fn service_origin(endpoint: &str) -> String {
    match Url::parse(endpoint) {
        Ok(parsed) if parsed.has_host() => parsed.origin().ascii_serialization(),
        _ => endpoint.trim_end_matches('/').to_string(),
    }
}

fn download_control() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(?:a|form|button)\b[^>]*download|<(?:a|button)\b[^>]*>[^<]*download")
            .expect("valid regex")
    })
}

/// Whether a page offers a download link, button or form
///
/// Plain text mentioning downloads (rate-limit and error pages) does not count.
pub fn has_download_control(html: &str) -> bool {
    download_control().is_match(html)
}

fn mp4_href() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"href="([^"]*\.mp4[^"]*)""#).expect("valid regex"))
}

/// `href` targets that contain `.mp4`, in page order, at most `limit`
pub fn extract_mp4_links(html: &str, limit: usize) -> Vec<String> {
    mp4_href()
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
        .take(limit)
        .collect()
}
