//! The bridge session: lifecycle plus the `exec`/`get`/`set`/`eval`/`call`
//! command surface.

use std::time::Duration;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::process::{JuliaProcess, JuliaProcessBuilder};
use crate::protocol::run;
use crate::value::{literal, JuliaExpr, Value};

use super::marshal::{check_errors, Marshaler};
use super::{SessionState, SessionStateMachine, SessionStats};

/// Hidden variable receiving `eval` and `call` results.
pub const RESULT_VAR: &str = "__jb_ans__";

/// Hidden variable bound to argument `index` of a `call`.
#[must_use]
pub fn arg_var(index: usize) -> String {
    format!("__jb_arg{index}__")
}

/// A session with one Julia interpreter process.
///
/// The interpreter is started on [`open`](Self::open), or implicitly by the
/// first command when `auto_open` is set, and killed on [`close`](Self::close)
/// or when the bridge is dropped. Commands take `&mut self`: a session
/// serves one request at a time.
///
/// # Example
///
/// ```ignore
/// use julia_bridge::{JuliaBridge, NumericArray, Value};
///
/// let mut julia = JuliaBridge::new();
/// julia.set("x", NumericArray::new(vec![2, 2], vec![1i32, 2, 3, 4], false)?).await?;
/// let total = julia.call("sum", &[JuliaBridge::expr("x").into()]).await?;
/// assert_eq!(total, Value::Int64(10));
/// ```
#[derive(Debug)]
pub struct JuliaBridge {
    config: BridgeConfig,
    builder: JuliaProcessBuilder,
    process: Option<JuliaProcess>,
    state: SessionStateMachine,
}

impl Default for JuliaBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl JuliaBridge {
    /// Bridge with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    /// Bridge with the given configuration.
    #[must_use]
    pub fn with_config(config: BridgeConfig) -> Self {
        let builder = JuliaProcessBuilder::from_config(&config);
        Self::with_builder(builder, config)
    }

    /// Bridge launching the interpreter from `builder`.
    #[must_use]
    pub fn with_builder(builder: JuliaProcessBuilder, config: BridgeConfig) -> Self {
        Self {
            config,
            builder,
            process: None,
            state: SessionStateMachine::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.state()
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.state.stats()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.process.is_some()
    }

    /// Whether the interpreter process is still alive.
    pub fn is_running(&mut self) -> bool {
        self.process.as_mut().is_some_and(JuliaProcess::is_running)
    }

    /// The interpreter's version banner, while open.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.process.as_ref().and_then(JuliaProcess::version)
    }

    /// Start the interpreter with the configured startup timeout.
    /// Does nothing if already open.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Spawn` or `BridgeError::Startup` if the
    /// interpreter cannot be brought up.
    pub async fn open(&mut self) -> Result<(), BridgeError> {
        self.open_with_timeout(self.config.startup_timeout()).await
    }

    /// Start the interpreter, waiting at most `timeout` for each startup line.
    /// Does nothing if already open.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Spawn` or `BridgeError::Startup` if the
    /// interpreter cannot be brought up.
    pub async fn open_with_timeout(&mut self, timeout: Duration) -> Result<(), BridgeError> {
        if self.is_open() {
            return Ok(());
        }
        let process = JuliaProcess::start(&self.builder, timeout, self.config.poll_delay()).await?;
        self.process = Some(process);
        self.state.transition(SessionState::Open);
        Ok(())
    }

    /// Kill the interpreter and drop its streams. Does nothing if not open.
    pub fn close(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.stop();
            self.state.transition(SessionState::Closed);
        }
    }

    /// The running process, opening one first when allowed.
    async fn ensure_open(&mut self) -> Result<&mut JuliaProcess, BridgeError> {
        if self.process.is_none() {
            if !self.config.auto_open {
                return Err(BridgeError::NotOpen);
            }
            self.open().await?;
        }
        self.state.record_request();
        self.process.as_mut().ok_or(BridgeError::NotOpen)
    }

    /// Run `code` and return the lines it printed.
    ///
    /// The value of the last expression is not printed; use
    /// [`eval`](Self::eval) to fetch it.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionBroken` if the request cannot be sent,
    /// or an open error if the interpreter had to be started.
    pub async fn exec(&mut self, code: &str) -> Result<Vec<String>, BridgeError> {
        let timeout = self.config.request_timeout();
        let process = self.ensure_open().await?;
        run(process.transport(), code, timeout).await
    }

    /// Fetch the value bound to `name`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::UnsupportedType` if the value's type has no
    /// decoding, `BridgeError::Protocol` or `BridgeError::ShortRead` if the
    /// interpreter's responses do not line up.
    pub async fn get(&mut self, name: &str) -> Result<Value, BridgeError> {
        let timeout = self.config.request_timeout();
        let process = self.ensure_open().await?;
        Marshaler::new(process.transport(), timeout).get(name).await
    }

    /// Bind `value` to `name`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Protocol` if the interpreter reports an error,
    /// `BridgeError::ConnectionBroken` if the pipes fail.
    pub async fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), BridgeError> {
        let value = value.into();
        self.set_value(name, &value).await
    }

    async fn set_value(&mut self, name: &str, value: &Value) -> Result<(), BridgeError> {
        let timeout = self.config.request_timeout();
        let process = self.ensure_open().await?;
        Marshaler::new(process.transport(), timeout)
            .set(name, value)
            .await
    }

    /// Rebind every name in `names` to `nothing`.
    async fn release(&mut self, names: &[String]) -> Result<(), BridgeError> {
        for name in names {
            self.set_value(name, &Value::Null).await?;
        }
        Ok(())
    }

    /// Fetch `RESULT_VAR`, then release it whatever the outcome.
    async fn take_result(&mut self) -> Result<Value, BridgeError> {
        let value = self.get(RESULT_VAR).await;
        let released = self.release(&[RESULT_VAR.to_string()]).await;
        let value = value?;
        released?;
        Ok(value)
    }

    /// Bind `RESULT_VAR` to `code`, failing if the interpreter reports an error.
    async fn assign_result(&mut self, code: &str) -> Result<(), BridgeError> {
        let lines = self.exec(&format!("{RESULT_VAR} = {code}")).await?;
        check_errors(lines).map(|_| ())
    }

    /// Evaluate an expression and fetch its value.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Protocol` if the expression throws, or any
    /// error from fetching the result.
    pub async fn eval(&mut self, code: &str) -> Result<Value, BridgeError> {
        self.assign_result(&format!("({code})")).await?;
        self.take_result().await
    }

    /// Call function `func` with `args` and fetch the result.
    ///
    /// Scalars, strings and expressions are inlined as literals; arrays are
    /// bound to hidden variables first and released after the call.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Protocol` if the call throws, or any error from
    /// binding arguments or fetching the result. Bound arguments are
    /// released on every path.
    pub async fn call(&mut self, func: &str, args: &[Value]) -> Result<Value, BridgeError> {
        let mut bound = Vec::new();
        let mut rendered = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            if let Some(lit) = literal(arg) {
                rendered.push(lit);
                continue;
            }
            let name = arg_var(index);
            if let Err(e) = self.set_value(&name, arg).await {
                if let Err(cleanup) = self.release(&bound).await {
                    tracing::warn!(error = %cleanup, "Failed to release call arguments");
                }
                return Err(e);
            }
            rendered.push(name.clone());
            bound.push(name);
        }

        let ran = self
            .assign_result(&format!("{func}({})", rendered.join(", ")))
            .await;
        let released = self.release(&bound).await;
        ran?;
        released?;
        self.take_result().await
    }

    /// Wrap Julia source text so it is passed through verbatim.
    #[must_use]
    pub fn expr(text: impl Into<String>) -> JuliaExpr {
        crate::value::expr(text)
    }

    /// Julia expression for the complex number `re + im*i`.
    #[must_use]
    pub fn complex(re: f64, im: f64) -> JuliaExpr {
        crate::value::complex(re, im)
    }
}

impl Drop for JuliaBridge {
    fn drop(&mut self) {
        self.close();
    }
}
