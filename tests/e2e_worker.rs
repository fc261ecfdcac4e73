//! E2E tests for the concurrency coordinator driving real workers.

use ssr_e2e_tests::{init_logging, ready_worker_script, script_supervisor, test_context};
use ssr_engine::{EngineError, Worker};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_run_without_registration_is_a_configuration_error() {
    init_logging();
    let result = Worker::new().run().await;
    assert!(matches!(result, Err(EngineError::NotConfigured(_))));
}

#[tokio::test]
async fn test_renderer_task_finishes_once_renderer_is_ready() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let ctx = test_context("ready-tok");
    let renderer = Arc::new(script_supervisor(
        tmp.path().join("renderer.sock"),
        &ready_worker_script(),
        &ctx,
    ));

    let mut worker = Worker::new();
    worker.register_renderer(renderer);
    assert_eq!(worker.task_count(), 1);

    tokio::time::timeout(Duration::from_secs(5), worker.run())
        .await
        .expect("renderer start hung")
        .unwrap();
}

#[tokio::test]
async fn test_independent_tasks_all_run_and_first_error_wins() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let ctx = test_context("ready-tok");

    let good = tmp.path().join("good.marker");
    let healthy = Arc::new(script_supervisor(
        tmp.path().join("a.sock"),
        &format!("touch {}; {}", good.display(), ready_worker_script()),
        &ctx,
    ));
    let broken = Arc::new(script_supervisor(
        tmp.path().join("b.sock"),
        "echo refusing to start >&2",
        &ctx,
    ));

    let mut worker = Worker::new();
    worker.register("healthy", async move { healthy.supervise_watch().await.map(|_| ()) });
    worker.register("broken", async move { broken.supervise_watch().await.map(|_| ()) });

    let result = tokio::time::timeout(Duration::from_secs(5), worker.run())
        .await
        .expect("worker run hung");
    assert!(matches!(result, Err(EngineError::WorkerExited { .. })));
    assert!(good.exists(), "healthy task never ran");
}
