//! Request/response framing over a [`Transport`].

use std::time::Duration;

use crate::error::BridgeError;
use crate::process::Transport;

use super::{request_line, strip_prompt, SENTINEL};

/// Start a request: discard stale output, then write `code; SENTINEL`.
///
/// # Errors
///
/// Returns `BridgeError::ConnectionBroken` if the write fails.
pub async fn send(transport: &mut Transport, code: &str) -> Result<(), BridgeError> {
    transport.drain_pending();
    tracing::debug!(code = %code, "Sending request");
    transport
        .write_line(&request_line(code))
        .await
        .map_err(BridgeError::ConnectionBroken)
}

/// Read lines until the sentinel, returning everything before it.
///
/// Stops early, returning what was collected, if a read yields nothing
/// before `timeout` or the streams close.
pub async fn collect_until_sentinel(transport: &mut Transport, timeout: Duration) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = transport.read_line(timeout).await {
        let line = strip_prompt(&line);
        if line == SENTINEL {
            return lines;
        }
        lines.push(line.to_string());
    }
    tracing::warn!(
        lines = lines.len(),
        eof = transport.is_eof(),
        "Response ended without sentinel"
    );
    lines
}

/// Run `code` and return its output lines.
///
/// # Errors
///
/// Returns `BridgeError::ConnectionBroken` if the request cannot be written.
pub async fn run(
    transport: &mut Transport,
    code: &str,
    timeout: Duration,
) -> Result<Vec<String>, BridgeError> {
    send(transport, code).await?;
    Ok(collect_until_sentinel(transport, timeout).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

    const WAIT: Duration = Duration::from_secs(2);

    fn harness() -> (Transport, DuplexStream, DuplexStream, DuplexStream) {
        let (input, child_stdin) = duplex(4096);
        let (child_stdout, output) = duplex(4096);
        let (child_stderr, errors) = duplex(4096);
        let transport = Transport::new(input, output, errors, Duration::from_millis(1));
        (transport, child_stdin, child_stdout, child_stderr)
    }

    #[tokio::test]
    async fn test_run_collects_until_sentinel() {
        let (mut t, stdin, mut stdout, _stderr) = harness();
        let responder = tokio::spawn(async move {
            let mut request = String::new();
            BufReader::new(stdin).read_line(&mut request).await.unwrap();
            stdout
                .write_all(b"julia> 3\n\"__##@@##__\"\n")
                .await
                .unwrap();
            (request, stdout)
        });

        let lines = run(&mut t, "println(1+2)", WAIT).await.unwrap();
        assert_eq!(lines, vec!["3".to_string()]);

        let (request, _stdout) = responder.await.unwrap();
        assert_eq!(request, "println(1+2); \"__##@@##__\"\n");
    }

    #[tokio::test]
    async fn test_collect_returns_lines_before_sentinel() {
        let (mut t, _stdin, mut stdout, _stderr) = harness();
        stdout
            .write_all(b"julia> a\nb\n\"__##@@##__\"\nafter\n")
            .await
            .unwrap();

        let lines = collect_until_sentinel(&mut t, WAIT).await;
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(t.read_line(WAIT).await.as_deref(), Some("after"));
    }

    #[tokio::test]
    async fn test_no_output_is_empty() {
        let (mut t, _stdin, mut stdout, _stderr) = harness();
        stdout.write_all(b"\"__##@@##__\"\n").await.unwrap();
        assert!(collect_until_sentinel(&mut t, WAIT).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_sentinel_returns_partial() {
        let (mut t, _stdin, mut stdout, stderr) = harness();
        stdout.write_all(b"ERROR: syntax\n").await.unwrap();
        drop(stdout);
        drop(stderr);

        let lines = collect_until_sentinel(&mut t, WAIT).await;
        assert_eq!(lines, vec!["ERROR: syntax".to_string()]);
    }

    #[tokio::test]
    async fn test_send_fails_when_pipe_closed() {
        let (mut t, stdin, _stdout, _stderr) = harness();
        drop(stdin);
        let err = send(&mut t, "1").await.unwrap_err();
        assert!(err.is_connection_lost());
    }
}
