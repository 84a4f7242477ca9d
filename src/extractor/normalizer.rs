//! Payload normalization
//!
//! One mapping per [`SourceTag`]. Missing optional fields fall back to
//! defaults; only a payload with no usable identity (no title and no page
//! URL) is rejected.

use crate::extractor::models::{Format, Payload, SourceTag, VideoMetadata};
use crate::utils::error::{ExtractError, Result};
use serde_json::Value;

const UNKNOWN: &str = "Unknown";
const RESTRICTED_PLATFORM: &str = "TikTok";

/// Build the canonical record for `payload`
pub fn normalize(payload: Payload) -> Result<VideoMetadata> {
    if payload.is_empty() {
        return Err(ExtractError::NormalizationRejected(format!(
            "{} payload is empty",
            payload.source
        )));
    }

    let title = source_title(&payload);
    let webpage_url = payload.webpage_url.clone().filter(|u| !u.trim().is_empty());
    if title.is_none() && webpage_url.is_none() {
        return Err(ExtractError::NormalizationRejected(format!(
            "{} payload has neither a title nor a page URL",
            payload.source
        )));
    }
    let webpage_url = webpage_url.unwrap_or_default();

    let body = &payload.body;
    let meta = match payload.source {
        SourceTag::Tikwm => VideoMetadata {
            title: title.unwrap_or_else(|| "TikTok Video".to_string()),
            uploader: body
                .get("author")
                .and_then(|a| str_field(a, "unique_id"))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            duration: int_field(body, "duration"),
            view_count: int_field(body, "play_count"),
            like_count: int_field(body, "digg_count"),
            comment_count: int_field(body, "comment_count"),
            share_count: int_field(body, "share_count"),
            upload_date: opaque_field(body, "create_time"),
            thumbnail_url: str_field(body, "cover"),
            description: str_field(body, "title").unwrap_or_default(),
            webpage_url,
            platform: RESTRICTED_PLATFORM.to_string(),
            formats: tikwm_formats(body),
            source: payload.source,
            note: None,
        },
        SourceTag::SaveTt => VideoMetadata {
            title: title.unwrap_or_else(|| "TikTok Video (SaveTT)".to_string()),
            uploader: author_name(body).unwrap_or_else(|| UNKNOWN.to_string()),
            duration: int_field(body, "duration"),
            view_count: None,
            like_count: None,
            comment_count: None,
            share_count: None,
            upload_date: None,
            thumbnail_url: str_field(body, "cover"),
            description: String::new(),
            webpage_url,
            platform: RESTRICTED_PLATFORM.to_string(),
            formats: savett_formats(body),
            source: payload.source,
            note: Some("Extracted using SaveTT fallback".to_string()),
        },
        SourceTag::SnapTik => link_only(
            title.unwrap_or_else(|| "TikTok Video (SnapTik)".to_string()),
            webpage_url,
            payload.source,
            link_formats(body, "snaptik", "snaptik_sd"),
            "Extracted using SnapTik fallback",
        ),
        SourceTag::TikMate => link_only(
            title.unwrap_or_else(|| "TikTok Video (TikMate)".to_string()),
            webpage_url,
            payload.source,
            link_formats(body, "tikmate", "tikmate_sd"),
            "Extracted using TikMate fallback",
        ),
        SourceTag::UrlHeuristic => link_only(
            title.unwrap_or_else(|| "TikTok Video".to_string()),
            webpage_url,
            payload.source,
            Vec::new(),
            "Limited info available - only the URL could be read",
        ),
        SourceTag::YtDlp => VideoMetadata {
            title: title.unwrap_or_else(|| UNKNOWN.to_string()),
            uploader: str_field(body, "uploader")
                .or_else(|| str_field(body, "channel"))
                .or_else(|| str_field(body, "uploader_id"))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            duration: int_field(body, "duration"),
            view_count: int_field(body, "view_count"),
            like_count: int_field(body, "like_count"),
            comment_count: int_field(body, "comment_count"),
            share_count: int_field(body, "repost_count"),
            upload_date: opaque_field(body, "upload_date")
                .or_else(|| opaque_field(body, "timestamp")),
            thumbnail_url: str_field(body, "thumbnail"),
            description: str_field(body, "description").unwrap_or_default(),
            webpage_url,
            platform: str_field(body, "extractor_key")
                .or_else(|| str_field(body, "extractor"))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            formats: ytdlp_formats(body),
            source: payload.source,
            note: None,
        },
    };

    Ok(meta)
}

/// Title as the source reports it, before any placeholder
fn source_title(payload: &Payload) -> Option<String> {
    match payload.source {
        SourceTag::UrlHeuristic => {
            str_field(&payload.body, "video_id").map(|id| format!("TikTok Video {}", id))
        }
        _ => str_field(&payload.body, "title"),
    }
}

fn link_only(
    title: String,
    webpage_url: String,
    source: SourceTag,
    formats: Vec<Format>,
    note: &str,
) -> VideoMetadata {
    VideoMetadata {
        title,
        uploader: UNKNOWN.to_string(),
        duration: None,
        view_count: None,
        like_count: None,
        comment_count: None,
        share_count: None,
        upload_date: None,
        thumbnail_url: None,
        description: String::new(),
        webpage_url,
        platform: RESTRICTED_PLATFORM.to_string(),
        formats,
        source,
        note: Some(note.to_string()),
    }
}

fn tikwm_formats(data: &Value) -> Vec<Format> {
    [
        ("hdplay", "hd", "HD", "mp4"),
        ("play", "sd", "SD", "mp4"),
        ("wmplay", "watermark", "SD (with watermark)", "mp4"),
        ("music", "audio", "Audio", "mp3"),
    ]
    .into_iter()
    .filter_map(|(key, id, quality, ext)| {
        str_field(data, key).map(|url| Format::new(id, Some(url), quality, ext))
    })
    .collect()
}

fn savett_formats(data: &Value) -> Vec<Format> {
    [
        ("video_hd", "hd", "HD", "mp4"),
        ("video", "sd", "SD", "mp4"),
        ("audio", "audio", "Audio", "mp3"),
    ]
    .into_iter()
    .filter_map(|(key, id, quality, ext)| {
        str_field(data, key).map(|url| Format::new(id, Some(url), quality, ext))
    })
    .collect()
}

/// Formats from a `links` list; one URL-less entry when the list is empty
fn link_formats(body: &Value, prefix: &str, degraded_id: &str) -> Vec<Format> {
    let links: Vec<String> = body
        .get("links")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if links.is_empty() {
        return vec![Format::new(degraded_id, None, "SD", "mp4")];
    }

    links
        .into_iter()
        .enumerate()
        .map(|(i, url)| Format::new(format!("{}_{}", prefix, i), Some(url), "SD", "mp4"))
        .collect()
}

/// yt-dlp lists formats worst-first; reverse so the best comes first
fn ytdlp_formats(info: &Value) -> Vec<Format> {
    let Some(items) = info.get("formats").and_then(Value::as_array) else {
        return str_field(info, "url")
            .map(|url| {
                vec![Format::new(
                    str_field(info, "format_id").unwrap_or_else(|| "best".to_string()),
                    Some(url),
                    ytdlp_quality(info),
                    str_field(info, "ext").unwrap_or_else(|| "mp4".to_string()),
                )]
            })
            .unwrap_or_default();
    };

    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .rev()
        .enumerate()
        .filter_map(|(i, f)| {
            let id = str_field(f, "format_id").unwrap_or_else(|| format!("ytdlp_{}", i));
            seen.insert(id.clone()).then(|| {
                Format::new(
                    id,
                    str_field(f, "url"),
                    ytdlp_quality(f),
                    str_field(f, "ext").unwrap_or_else(|| "mp4".to_string()),
                )
            })
        })
        .collect()
}

fn ytdlp_quality(f: &Value) -> String {
    str_field(f, "format_note")
        .or_else(|| str_field(f, "resolution"))
        .or_else(|| int_field(f, "height").map(|h| format!("{}p", h)))
        .unwrap_or_else(|| "unknown".to_string())
}

fn author_name(data: &Value) -> Option<String> {
    match data.get("author")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        obj @ Value::Object(_) => {
            str_field(obj, "unique_id").or_else(|| str_field(obj, "nickname"))
        }
        _ => None,
    }
}

/// Non-empty string at `key`
pub(crate) fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-negative integer at `key`, accepting floats and numeric strings
pub(crate) fn int_field(v: &Value, key: &str) -> Option<u64> {
    match v.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.round() as u64)
            })
        }
        _ => None,
    }
}

/// String or number at `key`, kept as text without reparsing
fn opaque_field(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
