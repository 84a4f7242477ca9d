//! Fallback orchestration
//!
//! Walks a [`StrategyChain`] in order and returns the first normalized record.
//! Every strategy runs behind a fault boundary: errors, empty payloads,
//! rejected payloads and panics all become "try the next one". Only chain
//! exhaustion (or caller cancellation) is reported back. Cancellation is
//! observed before each strategy and while one is running.

use crate::extractor::chain::StrategyChain;
use crate::extractor::models::VideoMetadata;
use crate::extractor::normalizer;
use crate::extractor::traits::Attempt;
use crate::utils::error::{ExtractError, Result};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How a successful chain run went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Name of the strategy that produced the record
    pub strategy: String,
    /// Strategies invoked, the winner included
    pub attempts: usize,
}

#[derive(Debug)]
pub struct Extraction {
    pub metadata: VideoMetadata,
    pub report: ChainReport,
}

pub struct Orchestrator;

impl Orchestrator {
    /// Run `chain` for `url` until one strategy yields a usable record
    pub async fn run(
        chain: &StrategyChain,
        url: &str,
        download: bool,
        cancel: &CancellationToken,
    ) -> Result<Extraction> {
        let mut attempts = 0;

        for strategy in chain.strategies() {
            if cancel.is_cancelled() {
                warn!(attempts, "Extraction cancelled by caller");
                return Err(ExtractError::Cancelled { attempts });
            }

            attempts += 1;
            let name = strategy.name();
            info!(strategy = name, family = %chain.family(), "Trying extraction strategy");

            // Dropping the guarded future abandons the attempt mid-flight
            let guarded = AssertUnwindSafe(strategy.attempt(url, download)).catch_unwind();
            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(strategy = name, attempts, "Extraction cancelled during strategy");
                    return Err(ExtractError::Cancelled { attempts });
                }
                outcome = guarded => outcome
                    .unwrap_or_else(|panic| Attempt::Failure(panic_message(panic.as_ref()))),
            };

            match attempt {
                Attempt::Success(payload) => {
                    let source = payload.source;
                    match normalizer::normalize(payload) {
                        Ok(metadata) => {
                            info!(strategy = name, %source, "Extraction succeeded");
                            return Ok(Extraction {
                                metadata,
                                report: ChainReport {
                                    strategy: name.to_string(),
                                    attempts,
                                },
                            });
                        }
                        Err(e) => {
                            warn!(strategy = name, reason = %e, "Strategy not applicable");
                        }
                    }
                }
                Attempt::Failure(reason) => {
                    warn!(strategy = name, reason = %reason, "Strategy failed");
                }
                Attempt::NotApplicable => {
                    warn!(strategy = name, reason = "not applicable", "Strategy skipped");
                }
            }
        }

        error!(attempts, family = %chain.family(), "Strategy chain exhausted for {}", url);
        Err(ExtractError::ChainExhausted { attempts })
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("strategy panicked: {}", detail)
}
