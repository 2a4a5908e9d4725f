//! Sentinel framing on top of the interpreter's interactive stream.
//!
//! The REPL has no notion of "end of response", so every request is sent
//! as `<code>; SENTINEL`. The REPL echoes the value of the last statement,
//! which is the sentinel string literal, and that line terminates the
//! response.
//!
//! # Wire Format
//!
//! ```text
//! host -> julia:  println(1+2); "__##@@##__"\n
//! julia -> host:  3\n
//!                 "__##@@##__"\n
//! ```

mod framer;

pub use framer::*;

/// End-of-response marker: a string literal that evaluates to itself.
pub const SENTINEL: &str = "\"__##@@##__\"";

/// Prefix of the banner line carrying the interpreter version.
pub const VERSION_PREFIX: &str = "Julia Version ";

/// Prompt the basic REPL prints before reading each input.
pub const PROMPT: &str = "julia> ";

/// Line printed right before a raw payload.
pub const RAW_MARKER: &str = "__jb_raw__";

/// Interpreter-side constant holding `Inf`.
pub const INF_CONST: &str = "__jb_inf__";

/// Interpreter-side helper printing the canonical runtime type of a value.
pub const DESCRIBE_FN: &str = "__jb_type__";

/// Fixed interpreter arguments: interactive, quiet, no startup file.
pub const STARTUP_ARGS: [&str; 3] = ["-iq", "--startup-file=no", "-e"];

/// Script run at launch.
///
/// Prints the version banner, installs the helpers the marshaler relies on,
/// and prints the sentinel once everything is defined. Type names are
/// spelled out canonically so `Vector`, `Matrix` and `ComplexF64` aliases
/// never reach the host.
#[must_use]
pub fn startup_script() -> String {
    [
        "using InteractiveUtils".to_string(),
        "versioninfo()".to_string(),
        "__jb_tname__(T::Type) = string(T)".to_string(),
        "__jb_tname__(::Type{Complex{T}}) where {T} = \"Complex{\" * __jb_tname__(T) * \"}\""
            .to_string(),
        "__jb_tname__(::Type{Array{T,N}}) where {T,N} = \"Array{\" * __jb_tname__(T) * \",\" * string(N) * \"}\""
            .to_string(),
        format!("{DESCRIBE_FN}(x) = println(__jb_tname__(typeof(x)))"),
        format!("const {INF_CONST} = Inf"),
        format!("show({SENTINEL})"),
        "println()".to_string(),
    ]
    .join("; ")
}

/// Strip any REPL prompts echoed in front of a line.
#[must_use]
pub fn strip_prompt(line: &str) -> &str {
    let mut rest = line;
    while let Some(stripped) = rest.strip_prefix(PROMPT) {
        rest = stripped;
    }
    rest
}

/// Command writing the raw bytes of `name`, preceded by [`RAW_MARKER`].
#[must_use]
pub fn raw_write_command(name: &str) -> String {
    format!("println(\"{RAW_MARKER}\"); write(stdout, {name})")
}

/// The line written for a request running `code`.
#[must_use]
pub fn request_line(code: &str) -> String {
    format!("{code}; {SENTINEL}")
}
