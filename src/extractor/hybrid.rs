use crate::extractor::chain::{ChainFactory, StrategyChain};
use crate::extractor::classifier::{PlatformFamily, UrlClassifier};
use crate::extractor::native::{
    FallbackService, RemoteApiClient, SaveTt, ShortLinkResolver, SnapTik, TikMate, TikwmApi,
};
use crate::extractor::orchestrator::{Extraction, Orchestrator};
use crate::extractor::ytdlp::find_ytdlp;
use crate::utils::config::ExtractorSettings;
use crate::utils::error::{ExtractError, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// The Hybrid Extractor
///
/// Entry point for callers: classifies the URL, builds the matching strategy
/// chain and hands it to the [`Orchestrator`]. Everything it holds is
/// read-only, so one instance can serve concurrent requests.
pub struct HybridExtractor {
    classifier: UrlClassifier,
    chains: ChainFactory,
}

impl HybridExtractor {
    /// Build an extractor, locating yt-dlp the usual way
    pub fn new(settings: ExtractorSettings) -> Result<Self> {
        let ytdlp_path = find_ytdlp(settings.ytdlp_path.as_deref());
        Self::with_ytdlp(settings, ytdlp_path)
    }

    /// Build an extractor with an explicit yt-dlp binary (or none at all)
    pub fn with_ytdlp(settings: ExtractorSettings, ytdlp_path: Option<PathBuf>) -> Result<Self> {
        settings.validate()?;

        let client = Client::builder()
            .connect_timeout(settings.request_timeout())
            .build()
            .map_err(|e| ExtractError::Config(format!("HTTP client: {}", e)))?;

        let resolver = ShortLinkResolver::new(
            client.clone(),
            settings.short_link_hosts.clone(),
            settings.not_found_markers.clone(),
            settings.resolve_timeout(),
        );
        let primary = TikwmApi::new(
            client.clone(),
            settings.api_endpoints.clone(),
            settings.api_media_base.clone(),
            settings.request_timeout(),
        );
        let services: Vec<Arc<dyn FallbackService>> = vec![
            Arc::new(SaveTt::new(client.clone(), settings.savett_url.clone(), settings.request_timeout())),
            Arc::new(SnapTik::new(client.clone(), settings.snaptik_url.clone(), settings.request_timeout())),
            Arc::new(TikMate::new(client, settings.tikmate_url.clone(), settings.request_timeout())),
        ];
        let remote = Arc::new(RemoteApiClient::new(resolver, primary, services));

        let classifier = UrlClassifier::new(&settings.restricted_domains);
        let chains = ChainFactory::new(Arc::new(settings), remote, ytdlp_path);

        Ok(Self { classifier, chains })
    }

    pub fn classifier(&self) -> &UrlClassifier {
        &self.classifier
    }

    pub fn classify(&self, url: &str) -> PlatformFamily {
        self.classifier.classify(url)
    }

    /// Chain that would run for `url`
    pub fn chain_for(&self, url: &str) -> StrategyChain {
        let family = self.classify(url);
        let chain = self.chains.build(family);
        debug!("Routing {} to {} chain: {:?}", url, family, chain.names());
        chain
    }

    /// Extract metadata for `url`
    pub async fn extract(&self, url: &str, download: bool) -> Result<Extraction> {
        self.extract_with_cancel(url, download, &CancellationToken::new())
            .await
    }

    /// Extract metadata, giving up between strategies once `cancel` fires
    pub async fn extract_with_cancel(
        &self,
        url: &str,
        download: bool,
        cancel: &CancellationToken,
    ) -> Result<Extraction> {
        let url = url.trim();
        let chain = self.chain_for(url);
        info!(
            "Extracting {} via {} chain ({} strategies)",
            url,
            chain.family(),
            chain.len()
        );
        Orchestrator::run(&chain, url, download, cancel).await
    }
}
