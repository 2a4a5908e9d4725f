//! Session lifecycle against the stand-in interpreter.

use julia_bridge::{BridgeConfig, BridgeError, JuliaBridge, SessionState};

#[tokio::test]
async fn test_open_is_idempotent() {
    let mut bridge = JuliaBridge::with_config(crate::fake_config());
    bridge.open().await.unwrap();
    bridge.open().await.unwrap();

    assert!(bridge.is_open());
    assert!(bridge.is_running());
    assert_eq!(bridge.state(), SessionState::Open);
    assert_eq!(bridge.version(), Some("Julia Version 1.10.0"));
    assert_eq!(bridge.stats().opens, 1);
}

#[tokio::test]
async fn test_close_then_reopen() {
    let mut bridge = JuliaBridge::with_config(crate::fake_config());
    bridge.open().await.unwrap();
    bridge.close();
    bridge.close();

    assert!(!bridge.is_open());
    assert!(bridge.version().is_none());
    assert_eq!(bridge.state(), SessionState::Closed);

    assert_eq!(bridge.exec("println(again)").await.unwrap(), vec!["again"]);
    assert_eq!(bridge.state(), SessionState::Open);
    assert_eq!(bridge.stats().opens, 2);
}

#[tokio::test]
async fn test_exec_opens_implicitly() {
    let mut bridge = JuliaBridge::with_config(crate::fake_config());
    assert!(!bridge.is_open());

    let lines = bridge.exec("println(3)").await.unwrap();
    assert_eq!(lines, vec!["3"]);
    assert!(bridge.is_open());
    assert_eq!(bridge.stats().requests, 1);
}

#[tokio::test]
async fn test_exec_without_output() {
    let mut bridge = JuliaBridge::with_config(crate::fake_config());
    assert!(bridge.exec("1+2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_explicit_open_required_without_auto_open() {
    let config = BridgeConfig {
        auto_open: false,
        ..crate::fake_config()
    };
    let mut bridge = JuliaBridge::with_config(config);
    assert!(matches!(bridge.exec("println(1)").await, Err(BridgeError::NotOpen)));

    bridge.open().await.unwrap();
    assert_eq!(bridge.exec("println(1)").await.unwrap(), vec!["1"]);
}

#[tokio::test]
async fn test_builder_without_startup() {
    let mut bridge = JuliaBridge::with_builder(crate::fake_julia(), crate::fake_config());
    assert_eq!(bridge.exec("println(ok)").await.unwrap(), vec!["ok"]);
}

#[tokio::test]
async fn test_lost_interpreter_is_reported_and_recoverable() {
    let mut bridge = JuliaBridge::with_config(crate::fake_config());
    bridge.open().await.unwrap();

    // The stand-in exits without answering.
    bridge.exec("exit()").await.unwrap();

    let err = bridge.exec("println(1)").await.unwrap_err();
    assert!(err.is_connection_lost(), "unexpected error: {err:?}");

    bridge.close();
    assert_eq!(bridge.exec("println(1)").await.unwrap(), vec!["1"]);
}

#[tokio::test]
async fn test_open_failure_leaves_bridge_closed() {
    let config = BridgeConfig {
        executable: Some("/nonexistent/julia".into()),
        ..crate::fake_config()
    };
    let mut bridge = JuliaBridge::with_config(config);
    assert!(matches!(bridge.open().await, Err(BridgeError::Spawn(_))));
    assert!(!bridge.is_open());
    assert_eq!(bridge.state(), SessionState::NotOpen);
}
