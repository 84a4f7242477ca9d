//! Strategy chains
//!
//! A chain is the ordered list of strategies for one platform family. Order
//! encodes observed reliability: API-backed strategy first, spoofed-client
//! yt-dlp runs next, the legacy cascade last.

use crate::extractor::classifier::PlatformFamily;
use crate::extractor::native::{RemoteApiClient, RemoteApiStrategy, UrlHeuristicStrategy};
use crate::extractor::profiles;
use crate::extractor::traits::Strategy;
use crate::extractor::ytdlp::{ProfileCascade, YtDlpStrategy};
use crate::utils::config::ExtractorSettings;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct StrategyChain {
    family: PlatformFamily,
    strategies: Vec<Arc<dyn Strategy>>,
}

impl StrategyChain {
    pub fn new(family: PlatformFamily, strategies: Vec<Arc<dyn Strategy>>) -> Self {
        Self { family, strategies }
    }

    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    pub fn strategies(&self) -> &[Arc<dyn Strategy>] {
        &self.strategies
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

impl std::fmt::Debug for StrategyChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyChain")
            .field("family", &self.family)
            .field("strategies", &self.names())
            .finish()
    }
}

/// Shared, read-only ingredients chains are assembled from
pub struct ChainFactory {
    settings: Arc<ExtractorSettings>,
    remote: Arc<RemoteApiClient>,
    ytdlp_path: Option<PathBuf>,
}

impl ChainFactory {
    pub fn new(
        settings: Arc<ExtractorSettings>,
        remote: Arc<RemoteApiClient>,
        ytdlp_path: Option<PathBuf>,
    ) -> Self {
        Self {
            settings,
            remote,
            ytdlp_path,
        }
    }

    pub fn build(&self, family: PlatformFamily) -> StrategyChain {
        let strategies = match family {
            PlatformFamily::RestrictedShortVideo => self.restricted(),
            PlatformFamily::General => vec![self.ytdlp("yt-dlp", profiles::STANDARD)],
        };
        StrategyChain::new(family, strategies)
    }

    fn restricted(&self) -> Vec<Arc<dyn Strategy>> {
        let mut chain: Vec<Arc<dyn Strategy>> =
            vec![Arc::new(RemoteApiStrategy::new(self.remote.clone()))];

        for profile in profiles::RESTRICTED_YTDLP {
            chain.push(self.ytdlp(&format!("yt-dlp ({})", profile.name), *profile));
        }

        let steps = profiles::ADVANCED_YTDLP
            .iter()
            .map(|profile| Arc::new(self.ytdlp_step(&format!("yt-dlp ({})", profile.name), *profile)))
            .collect();
        chain.push(Arc::new(ProfileCascade::new("Advanced extractor", steps)));

        if self.settings.metadata_only_fallback {
            chain.push(Arc::new(UrlHeuristicStrategy));
        }
        chain
    }

    fn ytdlp(&self, name: &str, profile: profiles::ClientProfile) -> Arc<dyn Strategy> {
        Arc::new(self.ytdlp_step(name, profile))
    }

    fn ytdlp_step(&self, name: &str, profile: profiles::ClientProfile) -> YtDlpStrategy {
        YtDlpStrategy::new(
            name,
            self.ytdlp_path.clone(),
            profile,
            self.settings.ytdlp_timeout(),
            self.settings.download_dir.clone(),
        )
    }
}
