//! Value exchange: `get` and `set` on top of the framer and raw transport.

use std::time::Duration;

use crate::error::BridgeError;
use crate::process::Transport;
use crate::protocol::{
    collect_until_sentinel, raw_write_command, run, send, strip_prompt, DESCRIBE_FN, RAW_MARKER,
};
use crate::value::{codec, literal, parse_dims, NumericArray, TypeDescriptor, Value};

/// Prefix the REPL puts on error reports.
const ERROR_PREFIX: &str = "ERROR:";

/// Encodes and decodes values over one transport.
pub(crate) struct Marshaler<'a> {
    transport: &'a mut Transport,
    timeout: Duration,
}

impl<'a> Marshaler<'a> {
    pub(crate) fn new(transport: &'a mut Transport, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Error for a response that produced nothing at all.
    fn silence(&self, what: &str) -> BridgeError {
        if self.transport.is_eof() {
            BridgeError::ConnectionBroken(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "interpreter output closed",
            ))
        } else {
            BridgeError::Protocol(format!("no {what} received"))
        }
    }

    /// Run an internal command, failing if the interpreter reported an error.
    async fn run_checked(&mut self, code: &str) -> Result<Vec<String>, BridgeError> {
        let lines = run(self.transport, code, self.timeout).await?;
        check_errors(lines)
    }

    /// Run a query and return the first non-empty line of its output.
    ///
    /// Blank lines are REPL noise that arrived after the previous drain;
    /// descriptors and sizes are never empty.
    async fn query_line(&mut self, code: &str, what: &str) -> Result<String, BridgeError> {
        let lines = self.run_checked(code).await?;
        match lines.into_iter().find(|l| !l.trim().is_empty()) {
            Some(line) => Ok(line),
            None => Err(self.silence(what)),
        }
    }

    /// Have the interpreter write `name`'s bytes and read exactly `n` of them.
    ///
    /// Everything up to the marker line is stale output or an echoed prompt.
    async fn read_raw(&mut self, name: &str, n: usize) -> Result<Vec<u8>, BridgeError> {
        send(self.transport, &raw_write_command(name)).await?;
        loop {
            let Some(line) = self.transport.read_line(self.timeout).await else {
                return Err(self.silence("raw payload"));
            };
            let line = strip_prompt(&line);
            if line == RAW_MARKER {
                break;
            }
            if line.starts_with(ERROR_PREFIX) {
                return Err(BridgeError::Protocol(format!("interpreter error: {line}")));
            }
            tracing::trace!(line = %line, "Skipped before raw payload");
        }
        let bytes = self.transport.read_exact(n, self.timeout).await;
        if bytes.len() < n {
            return Err(BridgeError::ShortRead {
                expected: n,
                received: bytes.len(),
            });
        }
        let trailing = collect_until_sentinel(self.transport, self.timeout).await;
        if !trailing.is_empty() {
            tracing::debug!(lines = ?trailing, "Output after raw payload");
        }
        Ok(bytes)
    }

    /// Fetch the value bound to `name`.
    pub(crate) async fn get(&mut self, name: &str) -> Result<Value, BridgeError> {
        let line = self
            .query_line(&format!("{DESCRIBE_FN}({name})"), "type descriptor")
            .await?;
        let descriptor = TypeDescriptor::parse(&line)
            .ok_or_else(|| BridgeError::UnsupportedType(line.trim().to_string()))?;
        tracing::trace!(name = %name, descriptor = ?descriptor, "Decoding value");

        match descriptor {
            TypeDescriptor::Null => Ok(Value::Null),
            TypeDescriptor::String => {
                let size = self
                    .query_line(&format!("println(sizeof({name}))"), "string size")
                    .await?;
                let n = parse_count(&size)?;
                let bytes = self.read_raw(name, n).await?;
                String::from_utf8(bytes)
                    .map(Value::String)
                    .map_err(|e| BridgeError::Protocol(format!("string is not UTF-8: {e}")))
            }
            TypeDescriptor::Scalar {
                kind,
                is_complex: false,
            } => {
                let bytes = self.read_raw(name, kind.width()).await?;
                codec::decode_scalar(kind, &bytes)
                    .ok_or_else(|| BridgeError::Protocol(format!("truncated {kind} scalar")))
            }
            TypeDescriptor::Scalar {
                kind,
                is_complex: true,
            } => {
                let bytes = self.read_raw(name, 2 * kind.width()).await?;
                let array = NumericArray::new(Vec::new(), codec::decode(kind, &bytes), true)?;
                Ok(Value::Array(array))
            }
            TypeDescriptor::Array {
                kind,
                is_complex,
                ndims,
            } => {
                let size = self
                    .query_line(&format!("println(size({name}))"), "array size")
                    .await?;
                let dims = parse_dims(&size, ndims)
                    .ok_or_else(|| BridgeError::Protocol(format!("malformed dims: {size}")))?;
                let factor = if is_complex { 2 } else { 1 };
                let n = dims.iter().product::<usize>() * factor * kind.width();
                let bytes = self.read_raw(name, n).await?;
                let array = NumericArray::new(dims, codec::decode(kind, &bytes), is_complex)?;
                Ok(Value::Array(array))
            }
        }
    }

    /// Bind `value` to `name`.
    pub(crate) async fn set(&mut self, name: &str, value: &Value) -> Result<(), BridgeError> {
        match (literal(value), value) {
            (Some(lit), _) => {
                self.run_checked(&format!("{name} = {lit}")).await?;
                Ok(())
            }
            (None, Value::Array(array)) => self.set_array(name, array).await,
            (None, other) => Err(BridgeError::UnsupportedType(other.type_name().to_string())),
        }
    }

    /// Declare an uninitialised array and stream its contents into it.
    async fn set_array(&mut self, name: &str, array: &NumericArray) -> Result<(), BridgeError> {
        let dims = array
            .dims()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let element = array.element_kind().julia_type(array.is_complex());
        send(
            self.transport,
            &format!("{name} = Array{{{element}}}(undef, {dims}); read!(stdin, {name})"),
        )
        .await?;

        let payload = codec::encode(array.data());
        tracing::trace!(name = %name, bytes = payload.len(), "Streaming array");
        self.transport
            .write_bytes(&payload)
            .await
            .map_err(BridgeError::ConnectionBroken)?;

        let lines = collect_until_sentinel(self.transport, self.timeout).await;
        check_errors(lines).map(|_| ())
    }
}

/// Fail on the first REPL error report in `lines`.
pub(crate) fn check_errors(lines: Vec<String>) -> Result<Vec<String>, BridgeError> {
    match lines.iter().find(|l| l.starts_with(ERROR_PREFIX)) {
        Some(err) => Err(BridgeError::Protocol(format!("interpreter error: {err}"))),
        None => Ok(lines),
    }
}

/// Parse a printed non-negative integer.
fn parse_count(line: &str) -> Result<usize, BridgeError> {
    line.trim()
        .parse()
        .map_err(|_| BridgeError::Protocol(format!("expected a byte count, got: {line}")))
}
