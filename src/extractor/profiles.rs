//! Client identity profiles
//!
//! Each profile is plain data: the user agent, extra headers and (for yt-dlp)
//! extractor arguments that make a request look like a particular app or
//! browser. Adding an identity means adding a row here, not a new code path.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientProfile {
    pub name: &'static str,
    pub user_agent: Option<&'static str>,
    pub headers: &'static [(&'static str, &'static str)],
    /// Passed to yt-dlp as `--extractor-args`
    pub extractor_args: Option<&'static str>,
    /// yt-dlp `--socket-timeout`, seconds
    pub socket_timeout_secs: u32,
    /// yt-dlp `--retries`
    pub retries: u32,
}

impl ClientProfile {
    /// Headers (including the user agent) as a reqwest header map
    ///
    /// Rows that are not valid header names/values are skipped with a warning.
    pub fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(ua) = self.user_agent {
            if let Ok(value) = HeaderValue::from_str(ua) {
                map.insert(reqwest::header::USER_AGENT, value);
            }
        }
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!(profile = self.name, header = *name, "Skipping invalid header"),
            }
        }
        map
    }

    /// yt-dlp command-line arguments for this identity
    pub fn ytdlp_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ua) = self.user_agent {
            args.push("--user-agent".to_string());
            args.push(ua.to_string());
        }
        for (name, value) in self.headers {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }
        if let Some(extractor_args) = self.extractor_args {
            args.push("--extractor-args".to_string());
            args.push(extractor_args.to_string());
        }
        args.push("--socket-timeout".to_string());
        args.push(self.socket_timeout_secs.to_string());
        args.push("--retries".to_string());
        args.push(self.retries.to_string());
        args
    }
}

/// Plain yt-dlp for unrestricted platforms
pub const STANDARD: ClientProfile = ClientProfile {
    name: "standard",
    user_agent: None,
    headers: &[],
    extractor_args: None,
    socket_timeout_secs: 60,
    retries: 3,
};

/// Current iOS app build talking to the mobile API host
pub const APP_UPDATED: ClientProfile = ClientProfile {
    name: "updated",
    user_agent: Some("TikTok 34.1.2 rv:341102 (iPhone; iOS 17.0; en_US) Cronet"),
    headers: &[
        ("Accept", "*/*"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Referer", "https://www.tiktok.com/"),
        ("X-Requested-With", "XMLHttpRequest"),
    ],
    extractor_args: Some(
        "tiktok:api_hostname=api16-normal-c-useast1a.tiktokv.com;app_version=34.1.2;build_number=341102",
    ),
    socket_timeout_secs: 30,
    retries: 5,
};

/// Android app identity
pub const APP_ANDROID: ClientProfile = ClientProfile {
    name: "mobile",
    user_agent: Some(
        "com.zhiliaoapp.musically/2023600040 (Linux; U; Android 13; en_US; Pixel 7; Build/TD1A.220804.031; Cronet/102.0.5005.125)",
    ),
    headers: &[("X-Argus", "null"), ("X-Ladon", "null")],
    extractor_args: None,
    socket_timeout_secs: 30,
    retries: 1,
};

/// Desktop Chrome identity
pub const DESKTOP_CHROME: ClientProfile = ClientProfile {
    name: "desktop",
    user_agent: Some(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ),
    headers: &[
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("Referer", "https://www.tiktok.com/"),
    ],
    extractor_args: None,
    socket_timeout_secs: 30,
    retries: 1,
};

/// Older iOS app build with pinned device ids
pub const APP_ENHANCED: ClientProfile = ClientProfile {
    name: "enhanced",
    user_agent: Some("TikTok 26.1.3 rv:261103 (iPhone; iOS 14.0; en_US) Cronet"),
    headers: &[
        ("Accept", "*/*"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Origin", "https://www.tiktok.com"),
        ("Referer", "https://www.tiktok.com/"),
        ("Sec-Fetch-Site", "same-site"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Dest", "empty"),
        ("X-Requested-With", "XMLHttpRequest"),
    ],
    extractor_args: Some(
        "tiktok:api_hostname=api16-normal-c-useast1a.tiktokv.com;app_version=26.1.3;build_number=261103;manifest_app_version=2611;device_id=7318518857994389254;install_id=7318518740146652166",
    ),
    socket_timeout_secs: 30,
    retries: 10,
};

/// Mobile Safari against an alternate API host
pub const MOBILE_SAFARI_ALT: ClientProfile = ClientProfile {
    name: "alternative",
    user_agent: Some(
        "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X) AppleWebKit/605.1.15",
    ),
    headers: &[
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("Referer", "https://www.tiktok.com/"),
    ],
    extractor_args: Some("tiktok:api_hostname=api19-normal-c-useast1a.tiktokv.com"),
    socket_timeout_secs: 30,
    retries: 1,
};

/// Android 10 app build
pub const APP_ANDROID_LEGACY: ClientProfile = ClientProfile {
    name: "legacy mobile",
    user_agent: Some(
        "com.zhiliaoapp.musically/2023600040 (Linux; U; Android 10; en_US; Pixel 4; Build/QQ3A.200805.001; Cronet/58.0.2991.0)",
    ),
    headers: &[("X-Argus", "null"), ("X-Ladon", "null")],
    extractor_args: None,
    socket_timeout_secs: 30,
    retries: 1,
};

/// Desktop browser asking the primary metadata API for JSON
pub const TIKWM_API: ClientProfile = ClientProfile {
    name: "tikwm api",
    user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"),
    headers: &[
        ("Accept", "application/json, text/plain, */*"),
        ("Accept-Encoding", "identity"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Referer", "https://www.tikwm.com/"),
        ("Origin", "https://www.tikwm.com"),
    ],
    extractor_args: None,
    socket_timeout_secs: 15,
    retries: 0,
};

/// jQuery-style XHR used by the SaveTT search form
pub const AJAX_FORM: ClientProfile = ClientProfile {
    name: "ajax form",
    user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"),
    headers: &[
        ("Accept", "application/json, text/javascript, */*; q=0.01"),
        ("X-Requested-With", "XMLHttpRequest"),
    ],
    extractor_args: None,
    socket_timeout_secs: 15,
    retries: 0,
};

/// Mobile Safari used for the HTML form services and short-link resolution
pub const MOBILE_SAFARI: ClientProfile = ClientProfile {
    name: "mobile safari",
    user_agent: Some(
        "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1",
    ),
    headers: &[
        ("Accept", "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8"),
        ("Accept-Language", "en-US,en;q=0.9"),
    ],
    extractor_args: None,
    socket_timeout_secs: 15,
    retries: 0,
};

/// yt-dlp identities the restricted chain runs as top-level strategies, in order
pub const RESTRICTED_YTDLP: &[ClientProfile] = &[APP_UPDATED, APP_ANDROID, DESKTOP_CHROME];

/// Identities the legacy "advanced" cascade tries, in order
pub const ADVANCED_YTDLP: &[ClientProfile] = &[APP_ENHANCED, MOBILE_SAFARI_ALT, APP_ANDROID_LEGACY];
