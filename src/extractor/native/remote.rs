//! Multi-endpoint metadata client and the strategy built on it
//!
//! Search order for one input URL:
//! 1. primary API, every mirror, with the resolved URL
//! 2. primary API, every mirror, with the original URL (if it differs)
//! 3. each fallback service with the resolved URL, then the original URL

use super::resolver::ShortLinkResolver;
use super::services::FallbackService;
use super::tikwm::TikwmApi;
use crate::extractor::models::Payload;
use crate::extractor::traits::Strategy;
use crate::utils::error::{ExtractError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RemoteApiClient {
    resolver: ShortLinkResolver,
    primary: TikwmApi,
    services: Vec<Arc<dyn FallbackService>>,
}

impl RemoteApiClient {
    pub fn new(
        resolver: ShortLinkResolver,
        primary: TikwmApi,
        services: Vec<Arc<dyn FallbackService>>,
    ) -> Self {
        Self {
            resolver,
            primary,
            services,
        }
    }

    pub async fn get_video_info(&self, url: &str) -> Result<Payload> {
        let resolved = self.resolver.resolve(url).await;
        let variants: Vec<&str> = if resolved == url {
            vec![url]
        } else {
            vec![resolved.as_str(), url]
        };

        let mut tried = 0;
        for variant in &variants {
            match self.primary.query(variant).await {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    tried += self.primary.endpoints().len();
                    warn!("Primary API failed for {}: {}", variant, e);
                }
            }
        }

        for service in &self.services {
            for variant in &variants {
                info!(service = service.name(), "Trying fallback service with {}", variant);
                tried += 1;
                match service.fetch(variant).await {
                    Ok(payload) => {
                        info!(service = service.name(), "Fallback service succeeded");
                        return Ok(payload);
                    }
                    Err(e) => {
                        warn!(service = service.name(), error = %e, "Fallback service failed for {}", variant);
                    }
                }
            }
        }

        Err(ExtractError::AllSourcesFailed { tried })
    }
}

/// The API-backed strategy at the head of the restricted chain
pub struct RemoteApiStrategy {
    client: Arc<RemoteApiClient>,
}

impl RemoteApiStrategy {
    pub fn new(client: Arc<RemoteApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Strategy for RemoteApiStrategy {
    fn name(&self) -> &str {
        "TikWM API"
    }

    async fn fetch(&self, url: &str, _download: bool) -> Result<Payload> {
        self.client.get_video_info(url).await
    }
}
