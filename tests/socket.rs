//! The raw-socket host, exercised with a real HTTP client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http_pipes::config::LimitsConfig;
use http_pipes::{
    choose, compose, get, ok, path, pipe_fn, post, respond, text, Context, Outcome, Pipe, PipeResult,
};

mod common;

fn app() -> impl Pipe {
    choose![
        get(path("/", |_| ok().body("Hello World!")).unwrap()),
        post(path("/echo", |_| text(|body| ok().body(body))).unwrap()),
        get(path("/teapot", |_| respond(418).reason("Short And Stout")).unwrap()),
    ]
}

#[tokio::test]
async fn test_serves_over_tcp() {
    let (addr, shutdown) = common::start_server(app()).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "Hello World!");

    let res = client.get(format!("http://{addr}/other")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let res = client
        .post(format!("http://{addr}/echo"))
        .body("ping")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "ping");

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_status_code() {
    let (addr, shutdown) = common::start_server(app()).await;
    let res = reqwest::get(format!("http://{addr}/teapot")).await.unwrap();
    assert_eq!(res.status().as_u16(), 418);
    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_clients() {
    let (addr, shutdown) = common::start_server(app()).await;
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let url = format!("http://{addr}/");
        tasks.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..10 {
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() {
                        ok += 1;
                    }
                }
            }
            ok
        }));
    }

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }
    assert_eq!(total, 80);
    shutdown.trigger();
}

#[tokio::test]
async fn test_stops_accepting_after_shutdown() {
    let (addr, shutdown) = common::start_server(app()).await;
    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = reqwest::Client::builder().timeout(Duration::from_secs(1)).build().unwrap();
    assert!(client.get(format!("http://{addr}/")).send().await.is_err());
}

fn sleepy(delay: Duration, finished: Arc<AtomicBool>) -> impl Pipe {
    compose(
        pipe_fn(move |ctx: Context| {
            let finished = Arc::clone(&finished);
            async move {
                tokio::time::sleep(delay).await;
                finished.store(true, Ordering::SeqCst);
                PipeResult::Ok(Outcome::Matched(ctx))
            }
        }),
        ok().body("slow but done"),
    )
}

#[tokio::test]
async fn test_shutdown_drains_in_flight_request() {
    let finished = Arc::new(AtomicBool::new(false));
    let pipe = sleepy(Duration::from_millis(800), Arc::clone(&finished));
    let (addr, shutdown, server) = common::spawn_server(pipe, &LimitsConfig::default()).await;

    let client = tokio::spawn(reqwest::get(format!("http://{addr}/")));
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.trigger();

    server.await.unwrap();
    assert!(finished.load(Ordering::SeqCst), "serve returned before the exchange completed");

    let res = client.await.unwrap().unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "slow but done");
}

#[tokio::test]
async fn test_request_timeout_from_limits() {
    let finished = Arc::new(AtomicBool::new(false));
    let pipe = sleepy(Duration::from_secs(3), Arc::clone(&finished));
    let limits = LimitsConfig {
        request_timeout_secs: 1,
        ..LimitsConfig::default()
    };
    let (addr, shutdown, _server) = common::spawn_server(pipe, &limits).await;

    let started = Instant::now();
    let res = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(res.status(), 408);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!finished.load(Ordering::SeqCst));
    shutdown.trigger();
}
