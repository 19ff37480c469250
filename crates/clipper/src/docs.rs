//! Doc-comment extraction.
//!
//! Commands are documented with ordinary rustdoc comments. The parser
//! recognizes a small convention:
//!
//! ```text
//! /// Greets someone by name.
//! ///
//! /// # Arguments
//! ///
//! /// * `name` - Who to greet.
//! /// * `times` - How many times to repeat the greeting,
//! ///   continued on the next line.
//! ///
//! /// # Returns
//! ///
//! /// The greeting text.
//! ```
//!
//! Everything before the first heading is the summary. `# Arguments`
//! (also `# Parameters` / `# Args`) holds one bullet per parameter, written
//! `` * `name` - text `` or `` - `name`: text ``. `# Returns` holds the return
//! description. Other sections (`# Examples`, `# Errors`, ...) are ignored.

use serde::Serialize;

/// Structured documentation of one function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocComment {
    /// Text before the first heading, trimmed. `None` when empty.
    pub summary: Option<String>,
    /// Documented parameters in the order they appear in the comment.
    pub parameters: Vec<(String, String)>,
    /// The `# Returns` section, joined into one line.
    pub returns: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Summary,
    Arguments,
    Returns,
    Other,
}

impl DocComment {
    /// Parses raw doc text (the joined contents of `#[doc = "..."]` attributes).
    pub fn parse(text: &str) -> Self {
        let mut section = Section::Summary;
        let mut summary: Vec<&str> = Vec::new();
        let mut parameters: Vec<(String, String)> = Vec::new();
        let mut returns: Vec<&str> = Vec::new();

        for raw in text.lines() {
            let line = raw.trim();

            if let Some(heading) = line.strip_prefix('#') {
                section = match heading.trim_start_matches('#').trim().to_ascii_lowercase().as_str() {
                    "arguments" | "parameters" | "args" => Section::Arguments,
                    "returns" | "return" => Section::Returns,
                    _ => Section::Other,
                };
                continue;
            }

            match section {
                Section::Summary => summary.push(line),
                Section::Returns => {
                    if !line.is_empty() {
                        returns.push(line);
                    }
                }
                Section::Arguments => {
                    if line.is_empty() {
                        continue;
                    }
                    if let Some(entry) = parse_parameter_line(line) {
                        parameters.push(entry);
                    } else if let Some((_, doc)) = parameters.last_mut() {
                        // continuation of the previous bullet
                        if !doc.is_empty() {
                            doc.push(' ');
                        }
                        doc.push_str(line);
                    }
                }
                Section::Other => {}
            }
        }

        let summary = summary.join("\n").trim().to_string();
        let returns = returns.join(" ");

        DocComment {
            summary: (!summary.is_empty()).then_some(summary),
            parameters,
            returns: (!returns.is_empty()).then_some(returns),
        }
    }

    /// Documentation of the named parameter, if any.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_str())
    }
}

/// Parses `` * `name` - text ``, `` - `name`: text `` or `* name - text`.
fn parse_parameter_line(line: &str) -> Option<(String, String)> {
    let rest = line
        .strip_prefix("* ")
        .or_else(|| line.strip_prefix("- "))?
        .trim_start();

    let (name, tail) = if let Some(quoted) = rest.strip_prefix('`') {
        let end = quoted.find('`')?;
        (&quoted[..end], &quoted[end + 1..])
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ':')
            .unwrap_or(rest.len());
        (&rest[..end], &rest[end..])
    };

    if name.is_empty() {
        return None;
    }

    let doc = tail
        .trim_start()
        .trim_start_matches([':', '-', '\u{2013}', '\u{2014}'])
        .trim();

    Some((name.to_string(), doc.to_string()))
}
