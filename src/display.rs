//! Colored CLI display utilities for bridge output.

use owo_colors::OwoColorize;

use crate::value::{ArrayData, NumericArray, Value};

/// Maximum number of array elements shown before eliding.
const MAX_ELEMENTS: usize = 16;

/// Truncate a string to a maximum length, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

fn format_elements(data: &ArrayData) -> Vec<String> {
    fn render<T: ToString>(v: &[T]) -> Vec<String> {
        v.iter().take(MAX_ELEMENTS).map(ToString::to_string).collect()
    }
    match data {
        ArrayData::Int8(v) => render(v),
        ArrayData::Int16(v) => render(v),
        ArrayData::Int32(v) => render(v),
        ArrayData::Int64(v) => render(v),
        ArrayData::Float32(v) => render(v),
        ArrayData::Float64(v) => render(v),
    }
}

fn format_array(array: &NumericArray) -> String {
    let element = array.element_kind().julia_type(array.is_complex());
    let shape = array
        .dims()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("×");
    let mut items = format_elements(array.data());
    if array.data().len() > MAX_ELEMENTS {
        items.push("…".to_string());
    }
    format!("{element}[{shape}] [{}]", items.join(", "))
}

/// Render a value for the terminal.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "nothing".to_string(),
        Value::Int8(v) => v.to_string(),
        Value::Int16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Float32(v) => v.to_string(),
        Value::Float64(v) => v.to_string(),
        Value::String(s) => format!("{s:?}"),
        Value::Array(a) => format_array(a),
        Value::Expr(e) => e.to_string(),
    }
}

/// Print interpreter output lines.
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Print a fetched value with its kind.
pub fn print_value(value: &Value) {
    println!(
        "{} {}",
        format!("[{}]", value.type_name()).cyan().bold(),
        format_value(value)
    );
}

/// Print the interpreter version banner.
pub fn print_version(version: Option<&str>) {
    match version {
        Some(v) => println!("{}", v.green()),
        None => println!("{}", "Julia version unknown".yellow()),
    }
}

/// Print an error to stderr.
pub fn print_error(err: &dyn std::error::Error) {
    eprintln!("{} {}", "[ERROR]".red().bold(), truncate(&err.to_string(), 400));
}
