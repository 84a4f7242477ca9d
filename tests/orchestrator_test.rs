//! Fallback behaviour of the orchestrator with scripted strategies

use async_trait::async_trait;
use clipfetch::extractor::{Orchestrator, Payload, PlatformFamily, SourceTag, Strategy, StrategyChain};
use clipfetch::ExtractError;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy)]
enum Script {
    Succeed,
    Fail,
    Panic,
    Empty,
    Decline,
}

struct Scripted {
    name: &'static str,
    script: Script,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(name: &'static str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name,
            script,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Strategy for Scripted {
    fn name(&self) -> &str {
        self.name
    }

    fn supports(&self, _url: &str) -> bool {
        !matches!(self.script, Script::Decline)
    }

    async fn fetch(&self, url: &str, _download: bool) -> clipfetch::utils::Result<Payload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Succeed => Ok(Payload::new(
                SourceTag::YtDlp,
                Some(url.to_string()),
                json!({
                    "title": format!("from {}", self.name),
                    "uploader": "someone",
                    "formats": [{"format_id": "18", "url": "https://cdn.example/v.mp4", "ext": "mp4", "height": 360}]
                }),
            )),
            Script::Fail => Err(ExtractError::ExtractionError(format!("{} failed", self.name))),
            Script::Panic => panic!("{} blew up", self.name),
            Script::Empty => Ok(Payload::new(SourceTag::YtDlp, None, json!({}))),
            Script::Decline => unreachable!("declined strategies are never fetched"),
        }
    }
}

fn chain(strategies: Vec<Arc<dyn Strategy>>) -> StrategyChain {
    StrategyChain::new(PlatformFamily::RestrictedShortVideo, strategies)
}

const URL: &str = "https://www.tiktok.com/@user/video/7";

#[tokio::test]
async fn first_success_stops_the_chain() {
    let a = Scripted::new("a", Script::Fail);
    let b = Scripted::new("b", Script::Succeed);
    let c = Scripted::new("c", Script::Succeed);
    let chain = chain(vec![a.clone(), b.clone(), c.clone()]);

    let out = Orchestrator::run(&chain, URL, false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.metadata.title(), "from b");
    assert_eq!(out.report.strategy, "b");
    assert_eq!(out.report.attempts, 2);
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 1);
    assert_eq!(c.calls(), 0, "strategy after the winner must not run");
}

#[tokio::test]
async fn panics_do_not_escape_and_count_as_failures() {
    let a = Scripted::new("a", Script::Panic);
    let b = Scripted::new("b", Script::Succeed);
    let chain = chain(vec![a.clone(), b.clone()]);

    let out = Orchestrator::run(&chain, URL, false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.report.strategy, "b");
    assert_eq!(a.calls(), 1);
}

#[tokio::test]
async fn exhaustion_reports_every_attempt() {
    let strategies: Vec<Arc<Scripted>> = vec![
        Scripted::new("fails", Script::Fail),
        Scripted::new("panics", Script::Panic),
        Scripted::new("empty", Script::Empty),
        Scripted::new("declines", Script::Decline),
        Scripted::new("fails again", Script::Fail),
    ];
    let chain = chain(
        strategies
            .iter()
            .map(|s| s.clone() as Arc<dyn Strategy>)
            .collect(),
    );

    let err = Orchestrator::run(&chain, URL, false, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ExtractError::ChainExhausted { attempts } => assert_eq!(attempts, chain.len()),
        other => panic!("expected chain exhaustion, got {other:?}"),
    }
    assert!(err_message_mentions_failure(chain.len()));
    assert_eq!(strategies[3].calls(), 0);
    for s in [&strategies[0], &strategies[1], &strategies[2], &strategies[4]] {
        assert_eq!(s.calls(), 1, "{} should run exactly once", s.name);
    }
}

fn err_message_mentions_failure(attempts: usize) -> bool {
    ExtractError::ChainExhausted { attempts }
        .to_string()
        .starts_with("Could not extract video")
}

#[tokio::test]
async fn cancellation_mid_chain_skips_the_rest() {
    struct CancelOnFetch {
        token: CancellationToken,
    }

    #[async_trait]
    impl Strategy for CancelOnFetch {
        fn name(&self) -> &str {
            "cancels"
        }

        async fn fetch(&self, _url: &str, _download: bool) -> clipfetch::utils::Result<Payload> {
            self.token.cancel();
            Err(ExtractError::Timeout("slow".into()))
        }
    }

    let token = CancellationToken::new();
    let after = Scripted::new("after", Script::Succeed);
    let chain = chain(vec![
        Arc::new(CancelOnFetch {
            token: token.clone(),
        }),
        after.clone(),
    ]);

    let err = Orchestrator::run(&chain, URL, false, &token).await.unwrap_err();
    assert!(matches!(err, ExtractError::Cancelled { attempts: 1 }));
    assert_eq!(after.calls(), 0);
}

#[tokio::test]
async fn concurrent_runs_share_a_chain() {
    let winner = Scripted::new("winner", Script::Succeed);
    let chain = Arc::new(chain(vec![Scripted::new("loser", Script::Fail), winner.clone()]));

    let mut handles = Vec::new();
    for i in 0..8 {
        let chain = chain.clone();
        handles.push(tokio::spawn(async move {
            let url = format!("https://www.tiktok.com/@user/video/{}", i);
            tokio::time::sleep(Duration::from_millis(5)).await;
            Orchestrator::run(&chain, &url, false, &CancellationToken::new()).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let out = handle.await.unwrap().unwrap();
        assert_eq!(
            out.metadata.webpage_url(),
            format!("https://www.tiktok.com/@user/video/{}", i)
        );
    }
    assert_eq!(winner.calls(), 8);
}

#[tokio::test]
async fn cancellation_abandons_a_slow_strategy() {
    struct Stalls;

    #[async_trait]
    impl Strategy for Stalls {
        fn name(&self) -> &str {
            "stalls"
        }

        async fn fetch(&self, _url: &str, _download: bool) -> clipfetch::utils::Result<Payload> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(ExtractError::Timeout("never reached".into()))
        }
    }

    let after = Scripted::new("after", Script::Succeed);
    let chain = chain(vec![Arc::new(Stalls), after.clone()]);

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = Orchestrator::run(&chain, URL, false, &token).await.unwrap_err();

    assert!(matches!(err, ExtractError::Cancelled { attempts: 1 }));
    assert!(started.elapsed() < Duration::from_secs(5), "took {:?}", started.elapsed());
    assert_eq!(after.calls(), 0);
}

#[tokio::test]
async fn download_intent_reaches_every_strategy_invoked() {
    struct RecordsDownload {
        succeed: bool,
        seen: std::sync::Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl Strategy for RecordsDownload {
        fn name(&self) -> &str {
            if self.succeed {
                "records and succeeds"
            } else {
                "records and fails"
            }
        }

        async fn fetch(&self, url: &str, download: bool) -> clipfetch::utils::Result<Payload> {
            self.seen.lock().unwrap().push(download);
            if !self.succeed {
                return Err(ExtractError::ExtractionError("no".into()));
            }
            Ok(Payload::new(SourceTag::YtDlp, Some(url.to_string()), json!({"title": "t"})))
        }
    }

    for download in [true, false] {
        let first = Arc::new(RecordsDownload {
            succeed: false,
            seen: Default::default(),
        });
        let second = Arc::new(RecordsDownload {
            succeed: true,
            seen: Default::default(),
        });
        let chain = chain(vec![first.clone(), second.clone()]);

        Orchestrator::run(&chain, URL, download, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(*first.seen.lock().unwrap(), [download]);
        assert_eq!(*second.seen.lock().unwrap(), [download]);
    }
}
