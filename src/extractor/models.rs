//! Data structures for video metadata and raw strategy payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which remote source (and therefore which payload shape) produced a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    /// Primary metadata API (`code`/`data` envelope)
    #[serde(rename = "tikwm")]
    Tikwm,
    /// SaveTT ajax search (`status`/`data` envelope)
    #[serde(rename = "savett")]
    SaveTt,
    /// SnapTik form endpoint (HTML download page)
    #[serde(rename = "snaptik")]
    SnapTik,
    /// TikMate form endpoint (HTML with anchor links)
    #[serde(rename = "tikmate")]
    TikMate,
    /// yt-dlp info dict
    #[serde(rename = "yt-dlp")]
    YtDlp,
    /// Video id recovered from the URL alone
    #[serde(rename = "url-heuristic")]
    UrlHeuristic,
}

impl SourceTag {
    pub const ALL: [SourceTag; 6] = [
        Self::Tikwm,
        Self::SaveTt,
        Self::SnapTik,
        Self::TikMate,
        Self::YtDlp,
        Self::UrlHeuristic,
    ];
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tikwm => "tikwm",
            Self::SaveTt => "savett",
            Self::SnapTik => "snaptik",
            Self::TikMate => "tikmate",
            Self::YtDlp => "yt-dlp",
            Self::UrlHeuristic => "url-heuristic",
        };
        f.write_str(name)
    }
}

/// Untyped-but-structured output of a successful strategy
///
/// `body` keeps the field names of whichever source answered; the
/// normalizer picks the mapping from `source`.
#[derive(Debug, Clone)]
pub struct Payload {
    pub source: SourceTag,
    pub webpage_url: Option<String>,
    pub body: Value,
}

impl Payload {
    pub fn new(source: SourceTag, webpage_url: Option<String>, body: Value) -> Self {
        Self {
            source,
            webpage_url,
            body,
        }
    }

    /// Null, `{}` and `[]` carry nothing worth normalizing
    pub fn is_empty(&self) -> bool {
        match &self.body {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// One playable media variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub format_id: String,
    /// `None` when a source found the item but not a usable link
    pub url: Option<String>,
    pub quality: String,
    pub ext: String,
}

impl Format {
    pub fn new(format_id: impl Into<String>, url: Option<String>, quality: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            format_id: format_id.into(),
            url,
            quality: quality.into(),
            ext: ext.into(),
        }
    }
}

/// Canonical metadata record
///
/// Built only by the normalizer; fields are read through getters so a record
/// cannot be changed after it has been accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub(crate) title: String,
    pub(crate) uploader: String,
    pub(crate) duration: Option<u64>,
    pub(crate) view_count: Option<u64>,
    pub(crate) like_count: Option<u64>,
    pub(crate) comment_count: Option<u64>,
    pub(crate) share_count: Option<u64>,
    pub(crate) upload_date: Option<String>,
    #[serde(rename = "thumbnail")]
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) description: String,
    pub(crate) webpage_url: String,
    pub(crate) platform: String,
    pub(crate) formats: Vec<Format>,
    pub(crate) source: SourceTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) note: Option<String>,
}

impl VideoMetadata {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn uploader(&self) -> &str {
        &self.uploader
    }

    pub fn duration(&self) -> Option<u64> {
        self.duration
    }

    pub fn view_count(&self) -> Option<u64> {
        self.view_count
    }

    pub fn like_count(&self) -> Option<u64> {
        self.like_count
    }

    pub fn comment_count(&self) -> Option<u64> {
        self.comment_count
    }

    pub fn share_count(&self) -> Option<u64> {
        self.share_count
    }

    pub fn upload_date(&self) -> Option<&str> {
        self.upload_date.as_deref()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn webpage_url(&self) -> &str {
        &self.webpage_url
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn source(&self) -> SourceTag {
        self.source
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Description cut to at most `limit` characters (on a char boundary)
    pub fn description_truncated(&self, limit: usize) -> &str {
        match self.description.char_indices().nth(limit) {
            Some((idx, _)) => &self.description[..idx],
            None => &self.description,
        }
    }
}
