use crate::extractor::models::Payload;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Outcome of running one strategy once
#[derive(Debug)]
pub enum Attempt {
    Success(Payload),
    Failure(String),
    /// The strategy declined to run (wrong URL shape, missing tool, ...)
    NotApplicable,
}

/// Core trait for all retrieval strategies
///
/// A strategy is one self-contained technique (an API, a spoofed client
/// identity, a library call). The orchestrator only ever calls [`attempt`],
/// so implementations just provide `fetch` and, optionally, `supports`.
///
/// [`attempt`]: Strategy::attempt
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Human-readable name used in log events (e.g. "TikWM API", "yt-dlp (mobile)")
    fn name(&self) -> &str;

    /// Checks if this strategy can handle the given URL
    fn supports(&self, _url: &str) -> bool {
        true
    }

    /// Retrieves a raw payload for the URL
    async fn fetch(&self, url: &str, download: bool) -> Result<Payload>;

    /// Runs the strategy, folding errors into [`Attempt::Failure`]
    async fn attempt(&self, url: &str, download: bool) -> Attempt {
        if !self.supports(url) {
            return Attempt::NotApplicable;
        }

        match self.fetch(url, download).await {
            Ok(payload) if payload.is_empty() => {
                Attempt::Failure("strategy returned an empty payload".to_string())
            }
            Ok(payload) => Attempt::Success(payload),
            Err(e) => Attempt::Failure(e.to_string()),
        }
    }
}
