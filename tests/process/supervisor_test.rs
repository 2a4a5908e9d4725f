//! Tests for interpreter startup and termination.

use std::time::{Duration, Instant};

use julia_bridge::process::{JuliaProcess, JuliaProcessBuilder};
use julia_bridge::protocol::run;
use julia_bridge::{BridgeError, SpawnError};

const POLL: Duration = Duration::from_millis(1);

#[tokio::test]
async fn test_start_captures_version() {
    let mut process = JuliaProcess::start(&crate::fake_julia(), Duration::from_secs(5), POLL)
        .await
        .expect("stand-in should start");

    assert_eq!(process.version(), Some("Julia Version 1.10.0"));
    assert!(process.id().is_some());
    assert!(process.is_running());
}

#[tokio::test]
async fn test_run_after_start() {
    let mut process = JuliaProcess::start(&crate::fake_julia(), Duration::from_secs(5), POLL)
        .await
        .unwrap();

    let lines = run(process.transport(), "println(hello)", Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(lines, vec!["hello"]);

    let lines = run(process.transport(), "1+2", Duration::from_secs(2))
        .await
        .unwrap();
    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_stop_kills_process() {
    let mut process = JuliaProcess::start(&crate::fake_julia(), Duration::from_secs(5), POLL)
        .await
        .unwrap();
    process.stop();
    process.stop();

    let deadline = Instant::now() + Duration::from_secs(5);
    while process.is_running() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!process.is_running());
}

#[tokio::test]
async fn test_start_fails_when_process_exits() {
    let builder = JuliaProcessBuilder::with_command("sh", ["-c", "exit 3"]).without_startup();
    let err = JuliaProcess::start(&builder, Duration::from_secs(5), POLL)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Startup(_)));
}

#[tokio::test]
async fn test_start_times_out_without_sentinel() {
    let builder =
        JuliaProcessBuilder::with_command("sh", ["-c", "echo warming up; sleep 30"]).without_startup();
    let started = Instant::now();
    let err = JuliaProcess::start(&builder, Duration::from_millis(200), POLL)
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(10));
    match err {
        BridgeError::Startup(reason) => assert!(reason.contains("warming up")),
        other => panic!("expected startup failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_start_missing_binary() {
    let builder = JuliaProcessBuilder::with_command("/nonexistent/julia", Vec::<String>::new());
    let err = JuliaProcess::start(&builder, Duration::from_secs(1), POLL)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Spawn(SpawnError::NotFound(_))));
}
