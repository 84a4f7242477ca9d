//! Short-link resolution
//!
//! Redirect-style share links are expanded with a single HEAD request. The
//! result is advisory: any failure hands back the original URL.

use crate::extractor::classifier::{host_matches, host_of};
use crate::extractor::profiles;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ShortLinkResolver {
    client: Client,
    short_hosts: Vec<String>,
    not_found_markers: Vec<String>,
    timeout: Duration,
}

impl ShortLinkResolver {
    pub fn new(
        client: Client,
        short_hosts: Vec<String>,
        not_found_markers: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            short_hosts: short_hosts.into_iter().map(|h| h.to_ascii_lowercase()).collect(),
            not_found_markers,
            timeout,
        }
    }

    pub fn is_short_link(&self, url: &str) -> bool {
        host_of(url).is_some_and(|host| self.short_hosts.iter().any(|h| host_matches(&host, h)))
    }

    /// Final URL after redirects, or `url` itself when it is not a short
    /// link or resolution is unusable
    pub async fn resolve(&self, url: &str) -> String {
        if !self.is_short_link(url) {
            return url.to_string();
        }

        info!("Resolving short link: {}", url);
        let response = match self
            .client
            .head(url)
            .headers(profiles::MOBILE_SAFARI.header_map())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Short link resolution failed for {}: {}", url, e);
                return url.to_string();
            }
        };

        let resolved = response.url().as_str().to_string();
        if response.status() == StatusCode::NOT_FOUND || self.looks_not_found(&resolved) {
            warn!(
                "Short link points at a missing video: {} -> {} ({})",
                url,
                resolved,
                response.status()
            );
            return url.to_string();
        }

        debug!("Resolved {} -> {}", url, resolved);
        resolved
    }

    fn looks_not_found(&self, resolved: &str) -> bool {
        let lowered = resolved.to_ascii_lowercase();
        self.not_found_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_ascii_lowercase()))
    }
}
