//! clipfetch library
//!
//! Fallback metadata extraction for short-form video URLs: a URL is
//! classified, an ordered chain of retrieval strategies is run until one
//! succeeds, and the winning payload is normalized into [`VideoMetadata`].

pub mod extractor;
pub mod utils;

// Re-export main types for easier use
pub use extractor::{
    Extraction, Format, HybridExtractor, PlatformFamily, StrategyChain, VideoMetadata,
};
pub use utils::{ExtractError, ExtractorSettings};
