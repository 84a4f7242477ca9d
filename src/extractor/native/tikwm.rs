//! Primary metadata API with endpoint rotation
//!
//! The API is served from several interchangeable mirrors. Each mirror gets
//! one bounded request; the first one that answers with a JSON envelope whose
//! `code` is 0 and whose `data` object is non-empty wins.

use super::request_error;
use crate::extractor::models::{Payload, SourceTag};
use crate::extractor::profiles;
use crate::utils::error::{ExtractError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Keys in the API's `data` object that hold media or image paths
pub const MEDIA_KEYS: [&str; 5] = ["hdplay", "play", "wmplay", "music", "cover"];

/// Make a media path returned by the API absolute
///
/// Absolute URLs pass through, `/x` and `x` both become `{base}/x`.
/// Returns `None` for empty input.
pub fn fix_media_url(base: &str, path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path.to_string());
    }
    if path.starts_with("//") {
        return Some(format!("https:{}", path));
    }

    let base = base.trim_end_matches('/');
    match path.strip_prefix('/') {
        Some(rest) => Some(format!("{}/{}", base, rest)),
        None => Some(format!("{}/{}", base, path)),
    }
}

#[derive(Debug, Clone)]
pub struct TikwmApi {
    client: Client,
    endpoints: Vec<String>,
    media_base: String,
    timeout: Duration,
}

impl TikwmApi {
    pub fn new(client: Client, endpoints: Vec<String>, media_base: String, timeout: Duration) -> Self {
        Self {
            client,
            endpoints,
            media_base,
            timeout,
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Try every endpoint in order for `url`
    pub async fn query(&self, url: &str) -> Result<Payload> {
        for endpoint in &self.endpoints {
            info!(endpoint = %endpoint, "Querying metadata API for {}", url);

            match self.query_endpoint(endpoint, url).await {
                Ok(mut data) => {
                    self.fix_paths(&mut data);
                    info!(endpoint = %endpoint, "Metadata API answered for {}", url);
                    return Ok(Payload::new(SourceTag::Tikwm, Some(url.to_string()), data));
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Metadata API endpoint failed");
                }
            }
        }

        Err(ExtractError::AllSourcesFailed {
            tried: self.endpoints.len(),
        })
    }

    async fn query_endpoint(&self, endpoint: &str, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("url", url),
                ("count", "12"),
                ("cursor", "0"),
                ("web", "1"),
                ("hd", "1"),
            ])
            .headers(profiles::TIKWM_API.header_map())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::HttpStatus {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.contains("application/json") {
            return Err(ExtractError::NonJson { content_type });
        }

        let text = response.text().await.map_err(|e| request_error(e, endpoint))?;
        let mut envelope: Value = serde_json::from_str(&text)?;

        let code = envelope.get("code").and_then(Value::as_i64);
        if code != Some(0) {
            let msg = envelope
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            return Err(ExtractError::Rejected(format!("code {:?}: {}", code, msg)));
        }

        let data = envelope.get_mut("data").map(Value::take).unwrap_or(Value::Null);
        let field_count = data.as_object().map_or(0, |fields| fields.len());
        if field_count == 0 {
            return Err(ExtractError::Rejected("missing data object".to_string()));
        }

        debug!("Endpoint {} returned {} data fields", endpoint, field_count);
        Ok(data)
    }

    /// Rewrite every media path in `data` to an absolute URL
    fn fix_paths(&self, data: &mut Value) {
        fix_media_paths(&self.media_base, data, &MEDIA_KEYS);
    }
}

/// Apply [`fix_media_url`] to every `keys` entry of a JSON object
///
/// Keys whose value is empty or not a string are removed.
pub fn fix_media_paths(base: &str, data: &mut Value, keys: &[&str]) {
    let Some(map) = data.as_object_mut() else {
        return;
    };
    for key in keys {
        let fixed = map
            .get(*key)
            .and_then(Value::as_str)
            .and_then(|path| fix_media_url(base, path));
        match fixed {
            Some(url) => {
                map.insert(key.to_string(), Value::String(url));
            }
            None => {
                map.remove(*key);
            }
        }
    }
}
