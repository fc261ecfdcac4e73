//! E2E tests for one-shot (build) execution.

use ssr_e2e_tests::{init_logging, script_supervisor, test_context};
use ssr_engine::EngineError;
use tempfile::TempDir;

#[tokio::test]
async fn test_build_succeeds_on_clean_exit_with_empty_stderr() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let ctx = test_context("tok");

    let supervisor = script_supervisor(tmp.path().join("b.sock"), "echo bundled", &ctx);
    supervisor.supervise_build().await.unwrap();
}

#[tokio::test]
async fn test_build_succeeds_on_nonzero_exit_with_empty_stderr() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let ctx = test_context("tok");

    // The build contract keys on the error stream, not the exit code.
    let supervisor = script_supervisor(tmp.path().join("b.sock"), "exit 3", &ctx);
    supervisor.supervise_build().await.unwrap();
}

#[tokio::test]
async fn test_build_fails_with_captured_stderr_text() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let ctx = test_context("tok");

    let supervisor = script_supervisor(
        tmp.path().join("b.sock"),
        "echo progress; echo 'SyntaxError: oh no' >&2",
        &ctx,
    );
    let result = supervisor.supervise_build().await;
    assert!(matches!(
        result,
        Err(EngineError::BuildFailed { stderr }) if stderr == "SyntaxError: oh no\n"
    ));
}

#[tokio::test]
async fn test_build_sees_spawn_contract_environment() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let ctx = test_context("tok");
    let witness = tmp.path().join("env-dump");

    let supervisor = script_supervisor(
        tmp.path().join("b.sock"),
        &format!("printf '%s|%s' \"$SOCKET\" \"$SIGNAL\" > {}", witness.display()),
        &ctx,
    );
    supervisor.supervise_build().await.unwrap();

    let dumped = std::fs::read_to_string(&witness).unwrap();
    assert_eq!(
        dumped,
        format!("{}|tok", tmp.path().join("b.sock").display())
    );
}
