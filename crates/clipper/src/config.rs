//! Help rendering configuration.

/// Configuration for help and usage rendering.
///
/// # Example
///
/// ```
/// use clipper::HelpConfig;
///
/// let config = HelpConfig::default().program("mytool").indent("  ");
/// assert_eq!(config.program.as_deref(), Some("mytool"));
/// ```
#[derive(Debug, Clone)]
pub struct HelpConfig {
    /// Name printed in usage lines in place of the registry's module name
    /// (typically the binary name). If None, the module name is used.
    pub program: Option<String>,
    /// Prefix of every entry line under `Usage:`, `Positional arguments:`
    /// and `Options:`.
    pub indent: String,
    /// Spaces between the padded name column and the description.
    pub column_gap: usize,
    /// Description of the synthetic `--help` option.
    pub help_text: String,
    /// Description of the synthetic `--version` option.
    pub version_text: String,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            program: None,
            indent: "    ".to_string(),
            column_gap: 2,
            help_text: "Show this screen.".to_string(),
            version_text: "Show version information.".to_string(),
        }
    }
}

impl HelpConfig {
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn column_gap(mut self, gap: usize) -> Self {
        self.column_gap = gap;
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    pub fn version_text(mut self, text: impl Into<String>) -> Self {
        self.version_text = text.into();
        self
    }

    /// Formats one `name  description` row, padding `name` to `width`.
    ///
    /// Trailing whitespace is dropped when the description is empty.
    pub(crate) fn row(&self, name: &str, width: usize, description: &str) -> String {
        let line = format!(
            "{}{:<width$}{}{}",
            self.indent,
            name,
            " ".repeat(self.column_gap),
            description,
            width = width
        );
        line.trim_end().to_string()
    }
}
