//! The demo's commands.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clipper::command;
use serde_json::json;

/// Adds two integers.
///
/// # Arguments
///
/// * `a` - The first addend.
/// * `b` - The second addend.
///
/// # Returns
///
/// The sum.
#[command]
pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// Divides one number by another.
///
/// # Arguments
///
/// * `dividend` - The number to divide.
/// * `divisor` - The number to divide by.
/// * `precision` - Decimal places to round to.
#[command]
pub fn divide(
    dividend: f64,
    divisor: f64,
    #[arg(default = 2)] precision: u32,
) -> anyhow::Result<String> {
    if divisor == 0.0 {
        bail!("cannot divide by zero");
    }
    Ok(format!(
        "{:.*}",
        precision as usize,
        dividend / divisor
    ))
}

/// Greets someone.
///
/// # Arguments
///
/// * `name` - Who to greet.
/// * `greeting` - The word to greet with.
/// * `times` - How often to repeat the greeting.
/// * `shout` - Print in upper case.
#[command]
pub fn greet(
    name: String,
    #[arg(default = "Hello")] greeting: String,
    #[arg(default = 1)] times: u8,
    #[flag] shout: bool,
) -> String {
    let line = format!("{greeting}, {name}!");
    let line = if shout { line.to_uppercase() } else { line };
    vec![line; usize::from(times)].join("\n")
}

/// Counts the lines, words and bytes of a file.
///
/// # Arguments
///
/// * `path` - The file to count.
/// * `label` - Name to report instead of the path.
#[command(name = "wc")]
pub fn word_count(path: PathBuf, label: Option<String>) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(json!({
        "file": label.unwrap_or_else(|| path.display().to_string()),
        "lines": text.lines().count(),
        "words": text.split_whitespace().count(),
        "bytes": text.len(),
    }))
}

/// Not a command: no `#[command]` marker.
pub fn helper() -> &'static str {
    "never listed"
}
