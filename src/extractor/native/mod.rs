//! Native strategies that talk to remote services directly over HTTP

pub mod heuristic;
pub mod remote;
pub mod resolver;
pub mod services;
pub mod tikwm;

pub use heuristic::UrlHeuristicStrategy;
pub use remote::{RemoteApiClient, RemoteApiStrategy};
pub use resolver::ShortLinkResolver;
pub use services::{FallbackService, SaveTt, SnapTik, TikMate};
pub use tikwm::{fix_media_paths, fix_media_url, TikwmApi};

use crate::utils::error::ExtractError;

/// Map a transport error, keeping timeouts distinguishable
pub(crate) fn request_error(err: reqwest::Error, target: &str) -> ExtractError {
    if err.is_timeout() {
        ExtractError::Timeout(target.to_string())
    } else {
        ExtractError::Network(err)
    }
}
