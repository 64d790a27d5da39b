//! Usage rendering.
//!
//! An [`OptionDef`](crate::OptionDef) only knows its own usage fragment. When
//! help is requested it asks a [`UsageRenderer`] for the text of the scope it
//! belongs to. The renderer is a lookup capability handed to the definition at
//! construction; the definition never owns its scope.

use std::cell::RefCell;

/// Produces the usage text shown when help is requested.
pub trait UsageRenderer {
    /// Full usage text.
    fn render_usage(&self) -> String;
}

impl<F> UsageRenderer for F
where
    F: Fn() -> String,
{
    fn render_usage(&self) -> String {
        self()
    }
}

/// One option's line in a scope help screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    /// Fragment from [`OptionDef::usage`](crate::OptionDef::usage).
    pub fragment: String,
    /// Short name without its marker.
    pub short: Option<String>,
    /// Long name without its markers.
    pub long: Option<String>,
    /// Description column.
    pub help: Option<String>,
}

/// Help screen of one flat scope.
///
/// Entries are appended as options are declared, so a renderer shared with
/// the first option already reflects options declared after it.
///
/// # Examples
///
/// ```
/// use argbind_core::{ScopeUsage, UsageEntry, UsageRenderer};
///
/// let usage = ScopeUsage::new("demo");
/// usage.push(UsageEntry {
///     fragment: "[-v|--verbose]".into(),
///     short: Some("v".into()),
///     long: Some("verbose".into()),
///     help: Some("Print more".into()),
/// });
///
/// let text = usage.render_usage();
/// assert!(text.starts_with("usage: demo [-v|--verbose]\n"));
/// assert!(text.contains("  -v  --verbose  Print more\n"));
/// ```
#[derive(Debug, Default)]
pub struct ScopeUsage {
    program: String,
    description: Option<String>,
    entries: RefCell<Vec<UsageEntry>>,
}

impl ScopeUsage {
    /// Creates an empty help screen for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            description: None,
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Adds a description paragraph below the usage line.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Program name shown on the usage line.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Appends an option's entry.
    pub fn push(&self, entry: UsageEntry) {
        self.entries.borrow_mut().push(entry);
    }

    /// Number of declared entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no entries have been declared.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Renders the full help screen.
    pub fn render(&self) -> String {
        let entries = self.entries.borrow();
        let mut out = format!("usage: {}", self.program);
        for entry in entries.iter() {
            out.push(' ');
            out.push_str(&entry.fragment);
        }
        out.push('\n');

        if let Some(description) = &self.description {
            out.push('\n');
            out.push_str(description);
            out.push('\n');
        }

        if entries.is_empty() {
            return out;
        }

        let cells: Vec<(String, String, &str)> = entries
            .iter()
            .map(|entry| {
                (
                    entry.short.as_deref().map(|s| format!("-{s}")).unwrap_or_default(),
                    entry.long.as_deref().map(|l| format!("--{l}")).unwrap_or_default(),
                    entry.help.as_deref().unwrap_or(""),
                )
            })
            .collect();
        let short_width = cells.iter().map(|(s, _, _)| s.len()).max().unwrap_or(0);
        let long_width = cells.iter().map(|(_, l, _)| l.len()).max().unwrap_or(0);

        out.push_str("\nArguments:\n\n");
        for (short, long, help) in &cells {
            let line = format!("  {short:<short_width$}  {long:<long_width$}  {help}");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

impl UsageRenderer for ScopeUsage {
    fn render_usage(&self) -> String {
        self.render()
    }
}
