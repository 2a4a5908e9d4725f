//! Deadline-bounded byte transport over the interpreter's pipes.
//!
//! Output from the child's stdout and stderr is copied by two pump tasks
//! into a single channel, merging both streams. Reads never block on the
//! pipes directly: they repeatedly take whatever bytes are available,
//! sleep for the poll delay, and give up when the deadline passes.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Line terminator on both directions of the wire.
pub const LF: u8 = b'\n';

/// Read size used by the pump tasks.
const PUMP_CHUNK: usize = 8192;

type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Copy everything from `source` into the channel until EOF or error.
async fn pump<R>(mut source: R, tx: UnboundedSender<Vec<u8>>, name: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; PUMP_CHUNK];
    loop {
        match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(stream = name, error = %e, "Interpreter stream read failed");
                break;
            }
        }
    }
    tracing::trace!(stream = name, "Interpreter stream closed");
}

/// Byte transport to and from the interpreter.
pub struct Transport {
    writer: Writer,
    rx: UnboundedReceiver<Vec<u8>>,
    pending: VecDeque<u8>,
    eof: bool,
    poll_delay: Duration,
    pumps: Vec<JoinHandle<()>>,
}

impl Transport {
    /// Create a transport writing to `input` and reading the merged
    /// contents of `output` and `errors`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<W, R, E>(input: W, output: R, errors: E, poll_delay: Duration) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
        E: AsyncRead + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let pumps = vec![
            tokio::spawn(pump(output, tx.clone(), "stdout")),
            tokio::spawn(pump(errors, tx, "stderr")),
        ];
        Self {
            writer: Box::new(input),
            rx,
            pending: VecDeque::new(),
            eof: false,
            poll_delay,
            pumps,
        }
    }

    /// Move every chunk already delivered by the pumps into the buffer.
    fn fill(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.eof = true;
                    break;
                }
            }
        }
    }

    /// Poll until `consume` reports completion, the streams close, or
    /// `timeout` elapses. `consume` is handed the buffered bytes each round
    /// and takes what it needs. Returns whether `consume` completed.
    async fn poll_until<F>(&mut self, timeout: Duration, mut consume: F) -> bool
    where
        F: FnMut(&mut VecDeque<u8>) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            self.fill();
            if consume(&mut self.pending) {
                return true;
            }
            if self.eof || Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.poll_delay).await;
        }
    }

    /// Read one line, without its terminator.
    ///
    /// Returns `None` if nothing arrived before the deadline (or the
    /// streams closed), and the partial line if the deadline hit mid-line.
    pub async fn read_line(&mut self, timeout: Duration) -> Option<String> {
        let mut line = Vec::new();
        let complete = self
            .poll_until(timeout, |pending| {
                while let Some(b) = pending.pop_front() {
                    if b == LF {
                        return true;
                    }
                    line.push(b);
                }
                false
            })
            .await;
        if !complete && line.is_empty() {
            return None;
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Read exactly `n` raw bytes, or fewer if the deadline passes first.
    pub async fn read_exact(&mut self, n: usize, timeout: Duration) -> Vec<u8> {
        let mut buf = Vec::with_capacity(n);
        self.poll_until(timeout, |pending| {
            let take = (n - buf.len()).min(pending.len());
            buf.extend(pending.drain(..take));
            buf.len() == n
        })
        .await;
        tracing::trace!(expected = n, bytes = buf.len(), "Raw read");
        buf
    }

    /// Write `text` followed by a line terminator, and flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipe to the interpreter is closed.
    pub async fn write_line(&mut self, text: &str) -> std::io::Result<()> {
        self.write_bytes(text.as_bytes()).await
    }

    /// Write raw bytes followed by a line terminator, and flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipe to the interpreter is closed.
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.write_all(&[LF]).await?;
        self.writer.flush().await
    }

    /// Discard all output received so far. Returns the number of bytes dropped.
    pub fn drain_pending(&mut self) -> usize {
        self.fill();
        let dropped = self.pending.len();
        self.pending.clear();
        if dropped > 0 {
            tracing::debug!(bytes = dropped, "Discarded stale interpreter output");
        }
        dropped
    }

    /// Whether both output streams have closed and all their bytes were read.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.eof && self.pending.is_empty()
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        for pump in &self.pumps {
            pump.abort();
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("pending", &self.pending.len())
            .field("eof", &self.eof)
            .field("poll_delay", &self.poll_delay)
            .finish_non_exhaustive()
    }
}
