//! Full pipeline: classifier, chain, orchestrator, remote client, normalizer

mod common;

use clipfetch::{ExtractError, HybridExtractor, PlatformFamily};
use common::{settings_for, EventLog};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn short_link_with_two_dead_mirrors_still_yields_one_record() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let short = format!("{}/short1", uri);
    let canonical = format!("{}/@user/video/42", uri);

    Mock::given(method("HEAD"))
        .and(path("/short1"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", canonical.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/@user/video/42"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let late = ResponseTemplate::new(200)
        .set_body_json(json!({"code": 0, "data": {"title": "too late"}}))
        .set_delay(Duration::from_secs(2));
    Mock::given(path("/ep1/api/"))
        .respond_with(late.clone())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/ep2/api/"))
        .respond_with(late)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ep3/api/"))
        .and(query_param("url", canonical.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "success",
            "data": {
                "id": "42",
                "title": "A dance",
                "author": {"nickname": "Dancer", "unique_id": "dancer"},
                "duration": 15,
                "play_count": 1000,
                "digg_count": "120",
                "hdplay": "/video/media/hdplay/42.mp4"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = EventLog::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(events.clone()));

    let extractor = HybridExtractor::with_ytdlp(settings_for(&server), None).unwrap();
    assert_eq!(extractor.classify(&short), PlatformFamily::RestrictedShortVideo);

    let out = extractor.extract(&short, false).await.unwrap();
    let meta = &out.metadata;

    assert_eq!(out.report.strategy, "TikWM API");
    assert_eq!(out.report.attempts, 1);
    assert_eq!(meta.title(), "A dance");
    assert_eq!(meta.uploader(), "dancer");
    assert_eq!(meta.platform(), "TikTok");
    assert_eq!(meta.duration(), Some(15));
    assert_eq!(meta.view_count(), Some(1000));
    assert_eq!(meta.like_count(), Some(120));
    assert_eq!(meta.formats().len(), 1);
    assert_eq!(meta.formats()[0].format_id, "hd");
    assert_eq!(
        meta.formats()[0].url.as_deref(),
        Some("https://www.tikwm.com/video/media/hdplay/42.mp4")
    );

    assert_eq!(events.endpoint_queries(), 3);
    assert_eq!(events.endpoint_failures(), 2);
}

#[tokio::test]
async fn restricted_chain_exhausts_when_every_source_fails() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // no yt-dlp: the profile strategies and the advanced cascade decline
    let extractor = HybridExtractor::with_ytdlp(settings_for(&server), None).unwrap();
    let url = "https://www.tiktok.com/@user/video/7";
    let chain_len = extractor.chain_for(url).len();

    let err = extractor.extract(url, false).await.unwrap_err();
    match err {
        ExtractError::ChainExhausted { attempts } => {
            assert_eq!(attempts, chain_len);
            assert_eq!(attempts, 5);
        }
        other => panic!("expected chain exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn metadata_only_fallback_rescues_exhausted_chain() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.metadata_only_fallback = true;
    let extractor = HybridExtractor::with_ytdlp(settings, None).unwrap();

    let out = extractor
        .extract("https://www.tiktok.com/@user/video/7301234567890", false)
        .await
        .unwrap();

    assert_eq!(out.report.strategy, "URL heuristic");
    assert_eq!(out.report.attempts, 6);
    assert!(out.metadata.title().contains("7301234567890"));
    assert_eq!(out.metadata.platform(), "TikTok");
}

#[tokio::test]
async fn general_urls_without_ytdlp_exhaust_their_single_strategy() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let extractor = HybridExtractor::with_ytdlp(settings_for(&server), None).unwrap();
    let err = extractor
        .extract("https://vimeo.com/123456", false)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::ChainExhausted { attempts: 1 }));
}

#[tokio::test]
async fn cancel_interrupts_slow_remote_sources() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.request_timeout_ms = 5_000;
    let extractor = HybridExtractor::with_ytdlp(settings, None).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = extractor
        .extract_with_cancel("https://www.tiktok.com/@user/video/7", false, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Cancelled { attempts: 1 }), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
}

/// Stand-in yt-dlp that echoes its arguments back as the description
#[cfg(unix)]
fn fake_ytdlp(dir: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("yt-dlp");
    std::fs::write(
        &script,
        "#!/bin/sh\nprintf '{\"title\":\"scripted\",\"webpage_url\":\"https://vimeo.com/1\",\"extractor_key\":\"Vimeo\",\"description\":\"%s\"}\\n' \"$*\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[tokio::test]
async fn download_intent_reaches_ytdlp() {
    let server = MockServer::start().await;
    let tools = tempfile::tempdir().unwrap();
    let downloads = tempfile::tempdir().unwrap();

    let mut settings = settings_for(&server);
    settings.download_dir = downloads.path().to_path_buf();
    let extractor =
        HybridExtractor::with_ytdlp(settings, Some(fake_ytdlp(tools.path()))).unwrap();

    let out = extractor.extract("https://vimeo.com/1", true).await.unwrap();
    let args = out.metadata.description();
    assert_eq!(out.metadata.platform(), "Vimeo");
    assert!(args.contains("--no-simulate"), "{args}");
    assert!(args.contains(&format!("-P {}", downloads.path().display())), "{args}");
    assert!(args.ends_with("-- https://vimeo.com/1"), "{args}");

    let out = extractor.extract("https://vimeo.com/1", false).await.unwrap();
    assert!(!out.metadata.description().contains("--no-simulate"));
}
