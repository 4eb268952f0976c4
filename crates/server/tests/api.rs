use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use batch_control_core::{BatchTask, JobController, LogSink, StartRequest, TaskContext, TaskError};
use batch_control_server::demo::TickerTask;
use batch_control_server::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to make a request to the app.
async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = if let Some(json) = body {
        builder = builder.header("content-type", "application/json");
        Body::from(serde_json::to_string(&json).unwrap())
    } else {
        Body::empty()
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn build(task: impl BatchTask + 'static) -> (axum::Router, Arc<JobController>) {
    let jobs = Arc::new(JobController::new(
        Arc::new(task),
        Arc::new(LogSink::with_default_capacity()),
    ));
    (create_app(AppState::new(Arc::clone(&jobs))), jobs)
}

fn start_body() -> Value {
    json!({ "count": 1, "password": "pw", "headless": true })
}

struct RaisesBoom;

#[async_trait]
impl BatchTask for RaisesBoom {
    async fn run(&self, _request: StartRequest, ctx: TaskContext) -> Result<(), TaskError> {
        ctx.info("about to fail");
        panic!("boom");
    }

    fn name(&self) -> &str {
        "raises-boom"
    }
}

#[tokio::test]
async fn second_start_while_running_is_rejected() {
    let (app, jobs) = build(TickerTask::new(Duration::from_secs(60)));

    let (status, body) = request(&app, "POST", "/start", Some(start_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (_, body) = request(&app, "POST", "/start", Some(start_body())).await;
    assert_eq!(body, json!({ "status": "error", "message": "Already running" }));

    request(&app, "POST", "/stop", None).await;
    jobs.join().await;
}

#[tokio::test]
async fn logs_keep_only_the_newest_hundred() {
    let (app, jobs) = build(TickerTask::new(Duration::from_millis(1)));
    for i in 0..150 {
        jobs.logs().info(format!("entry {i}"));
    }

    let (status, body) = request(&app, "GET", "/logs", None).await;
    assert_eq!(status, StatusCode::OK);
    let lines = body["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 100);
    for (offset, line) in lines.iter().enumerate() {
        assert_eq!(line["msg"], format!("entry {}", offset + 50));
        assert_eq!(line["level"], "INFO");
    }

    let (_, body) = request(&app, "GET", "/logs", None).await;
    assert_eq!(body, json!({ "lines": [] }));
}

#[tokio::test]
async fn stop_while_idle_is_ignored() {
    let (app, jobs) = build(TickerTask::new(Duration::from_millis(1)));

    let (status, body) = request(&app, "POST", "/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ignored", "message": "Not running" }));
    assert!(!jobs.is_running());
}

#[tokio::test]
async fn raising_task_reports_error_then_finished() {
    let (app, jobs) = build(RaisesBoom);

    request(&app, "POST", "/start", Some(start_body())).await;
    assert!(jobs.join().await);

    let (_, body) = request(&app, "GET", "/logs", None).await;
    assert_eq!(
        body["lines"],
        json!([
            { "msg": "about to fail", "level": "INFO" },
            { "msg": "Server Error: boom", "level": "ERR" },
            { "msg": "Process finished.", "level": "INFO" },
        ])
    );

    let (_, status) = request(&app, "GET", "/status", None).await;
    assert_eq!(status["status"], "finished");
    assert_eq!(status["running"], false);

    // The controller accepts a new run after a failure.
    let (_, body) = request(&app, "POST", "/start", Some(start_body())).await;
    assert_eq!(body["status"], "ok");
    jobs.join().await;
}

#[tokio::test]
async fn full_run_with_builtin_task() {
    let (app, jobs) = build(TickerTask::new(Duration::from_millis(1)));

    let (_, body) = request(
        &app,
        "POST",
        "/start",
        Some(json!({ "count": 3, "password": "pw", "headless": false })),
    )
    .await;
    assert_eq!(body["status"], "ok");
    jobs.join().await;

    let (_, body) = request(&app, "GET", "/logs", None).await;
    let messages: Vec<&str> = body["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["msg"].as_str().unwrap())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Starting batch of 3 items (headless: false)",
            "[1/3] item processed",
            "[2/3] item processed",
            "[3/3] item processed",
            "Batch complete: 3 items processed.",
            "Process finished.",
        ]
    );
}

#[tokio::test]
async fn stop_halts_builtin_task() {
    let (app, jobs) = build(TickerTask::new(Duration::from_millis(20)));

    request(
        &app,
        "POST",
        "/start",
        Some(json!({ "count": 10_000, "password": "pw", "headless": true })),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(70)).await;

    let (_, body) = request(&app, "POST", "/stop", None).await;
    assert_eq!(body, json!({ "status": "ok", "message": "Stopping..." }));

    tokio::time::timeout(Duration::from_secs(5), jobs.join())
        .await
        .expect("task should honour stop");

    let (_, body) = request(&app, "GET", "/logs", None).await;
    let lines = body["lines"].as_array().unwrap();
    let halted = lines
        .iter()
        .any(|line| line["msg"].as_str().unwrap().starts_with("Stop requested, halting after"));
    assert!(halted, "expected a halt message in {lines:?}");
    assert_eq!(lines.last().unwrap()["msg"], "Process finished.");
}
