pub mod chain;
pub mod classifier;
pub mod hybrid;
pub mod models;
pub mod native;
pub mod normalizer;
pub mod orchestrator;
pub mod profiles;
pub mod traits;
pub mod ytdlp;

pub use chain::StrategyChain;
pub use classifier::{PlatformFamily, UrlClassifier};
pub use hybrid::HybridExtractor;
pub use models::{Format, Payload, SourceTag, VideoMetadata};
pub use orchestrator::{ChainReport, Extraction, Orchestrator};
pub use traits::{Attempt, Strategy};
pub use ytdlp::YtDlpStrategy;
