//! Option definitions: matching, token consumption, and typed binding.
//!
//! An [`OptionDef`] describes one declared option. A driver such as
//! [`Scope`](crate::Scope) uses it in a fixed order for every token position:
//!
//! 1. [`check`](OptionDef::check) tests whether the token names the option.
//! 2. [`parse`](OptionDef::parse) binds the follow-on tokens into the
//!    option's [`OutputSlot`].
//! 3. [`reduce`](OptionDef::reduce) blanks the consumed tokens so that no
//!    other option sees them again.
//!
//! Boolean flags match inside short clusters (`-abc` matches `a`, `b` and
//! `c`) and are removed from the cluster one character at a time. Every
//! other kind must appear as its own token.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ArgError, ArityProblem, BoxError, Result};
use crate::file::{FileMode, FileOpener, SystemOpener};
use crate::usage::{UsageEntry, UsageRenderer};

/// Reserved short help token.
pub const HELP_SHORT: &str = "-h";
/// Reserved long help token.
pub const HELP_LONG: &str = "--help";

const MARKER: u8 = b'-';

/// Caller-supplied pre-check over the raw follow-on tokens.
pub type Validator = Box<dyn Fn(&[String]) -> std::result::Result<(), BoxError>>;

/// Kind of destination an option binds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// Boolean flag, takes no value.
    Flag,
    /// Single string value, optionally restricted to choices.
    Text,
    /// Path opened as a file at bind time.
    File,
    /// String value appended on every occurrence.
    List,
    /// Prints usage when seen.
    Help,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flag => "flag",
            Self::Text => "string",
            Self::File => "file",
            Self::List => "list",
            Self::Help => "help",
        };
        f.write_str(name)
    }
}

impl FromStr for SlotKind {
    type Err = ArgError;

    /// Parses a declared kind. `selector` is a text option with choices.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flag" | "bool" | "boolean" => Ok(Self::Flag),
            "string" | "text" | "selector" => Ok(Self::Text),
            "file" => Ok(Self::File),
            "list" => Ok(Self::List),
            "help" => Ok(Self::Help),
            _ => Err(ArgError::UnsupportedKind(s.to_string())),
        }
    }
}

/// Destination of a bound option. The variant is fixed at construction.
#[derive(Debug)]
pub enum OutputSlot {
    /// Set to `true` on the first match.
    Flag(bool),
    /// Last bound value, `None` until bound.
    Text(Option<String>),
    /// File opened from the bound path.
    File {
        /// How the path is opened.
        mode: FileMode,
        /// Path that was opened.
        path: Option<PathBuf>,
        /// Opened handle, until moved out with [`OptionDef::take_file`].
        file: Option<File>,
    },
    /// Values in the order they were bound.
    List(Vec<String>),
    /// Never holds a value.
    Help,
}

impl OutputSlot {
    /// Kind of this slot.
    pub fn kind(&self) -> SlotKind {
        match self {
            Self::Flag(_) => SlotKind::Flag,
            Self::Text(_) => SlotKind::Text,
            Self::File { .. } => SlotKind::File,
            Self::List(_) => SlotKind::List,
            Self::Help => SlotKind::Help,
        }
    }

    /// Snapshot of the bound value, suitable for serialization.
    pub fn value(&self) -> BoundValue {
        match self {
            Self::Flag(value) => BoundValue::Flag(*value),
            Self::Text(value) => BoundValue::Text(value.clone()),
            Self::File { path, .. } => {
                BoundValue::File(path.as_ref().map(|p| p.display().to_string()))
            }
            Self::List(values) => BoundValue::List(values.clone()),
            Self::Help => BoundValue::Help,
        }
    }
}

/// Serializable view of an [`OutputSlot`].
///
/// File slots report the path that was opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BoundValue {
    Flag(bool),
    Text(Option<String>),
    File(Option<String>),
    List(Vec<String>),
    Help,
}

/// One declared option.
///
/// Names are stored without their leading markers: a short name `o` matches
/// `-o`, a long name `out` matches `--out`.
///
/// # Examples
///
/// ```
/// use argbind_core::{BoundValue, OptionDef};
///
/// let mut format = OptionDef::selector(Some("f"), Some("format"), &["json", "yaml"]);
/// let mut tokens: Vec<String> = ["-f", "yaml", "rest"].iter().map(|s| s.to_string()).collect();
///
/// assert!(format.check(&tokens[0]).unwrap());
/// format.parse(format.arguments_at(0, &tokens)).unwrap();
/// format.reduce(0, &mut tokens);
///
/// assert_eq!(tokens, vec!["", "", "rest"]);
/// assert_eq!(format.value(), BoundValue::Text(Some("yaml".into())));
/// assert_eq!(format.usage(), "[-f|--format (json|yaml)]");
/// ```
pub struct OptionDef {
    short: Option<String>,
    long: Option<String>,
    arity: usize,
    unique: bool,
    parsed: bool,
    required: bool,
    help: Option<String>,
    validator: Option<Validator>,
    choices: Option<Vec<String>>,
    slot: OutputSlot,
    opener: Box<dyn FileOpener>,
    renderer: Option<Rc<dyn UsageRenderer>>,
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("arity", &self.arity)
            .field("unique", &self.unique)
            .field("parsed", &self.parsed)
            .field("required", &self.required)
            .field("choices", &self.choices)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl OptionDef {
    fn new(short: Option<&str>, long: Option<&str>, slot: OutputSlot) -> Self {
        let arity = match slot {
            OutputSlot::Flag(_) | OutputSlot::Help => 0,
            OutputSlot::Text(_) | OutputSlot::File { .. } | OutputSlot::List(_) => 1,
        };
        Self {
            short: short.filter(|s| !s.is_empty()).map(String::from),
            long: long.filter(|l| !l.is_empty()).map(String::from),
            arity,
            unique: false,
            parsed: false,
            required: false,
            help: None,
            validator: None,
            choices: None,
            slot,
            opener: Box::new(SystemOpener),
            renderer: None,
        }
    }

    /// Creates a boolean flag.
    pub fn flag(short: Option<&str>, long: Option<&str>) -> Self {
        Self::new(short, long, OutputSlot::Flag(false))
    }

    /// Creates an option taking one string value.
    pub fn text(short: Option<&str>, long: Option<&str>) -> Self {
        Self::new(short, long, OutputSlot::Text(None))
    }

    /// Creates a string option restricted to `choices`.
    pub fn selector(short: Option<&str>, long: Option<&str>, choices: &[&str]) -> Self {
        let mut def = Self::text(short, long);
        def.choices = Some(choices.iter().map(|c| c.to_string()).collect());
        def
    }

    /// Creates an option whose value is a path opened with `mode`.
    pub fn file(short: Option<&str>, long: Option<&str>, mode: FileMode) -> Self {
        Self::new(
            short,
            long,
            OutputSlot::File {
                mode,
                path: None,
                file: None,
            },
        )
    }

    /// Creates an option collecting one string per occurrence.
    pub fn list(short: Option<&str>, long: Option<&str>) -> Self {
        Self::new(short, long, OutputSlot::List(Vec::new()))
    }

    /// Creates an option that requests help.
    pub fn help(short: Option<&str>, long: Option<&str>) -> Self {
        Self::new(short, long, OutputSlot::Help)
    }

    /// Marks the option as required. Only affects usage rendering here;
    /// drivers enforce presence.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Rejects a second successful bind.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Adds a one-line description for help screens.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Replaces the choice set. Ignored by every kind except text.
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Runs `validator` over the raw follow-on tokens before binding.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&[String]) -> std::result::Result<(), BoxError> + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Sets the renderer asked for usage text when help is requested.
    pub fn with_renderer(mut self, renderer: Rc<dyn UsageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Sets the opener used by file options.
    pub fn with_opener(mut self, opener: impl FileOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    /// Short name without its marker.
    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    /// Long name without its markers.
    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// Number of follow-on tokens consumed after the option token.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Whether a second bind is rejected.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Whether the option must appear in a pass.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether a bind has succeeded on this definition.
    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// One-line description for help screens.
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Allowed values of a text option.
    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    /// Kind of the output slot.
    pub fn kind(&self) -> SlotKind {
        self.slot.kind()
    }

    /// Output slot holding the bound value.
    pub fn slot(&self) -> &OutputSlot {
        &self.slot
    }

    /// Snapshot of the bound value.
    pub fn value(&self) -> BoundValue {
        self.slot.value()
    }

    /// Moves the opened file out of a file slot.
    pub fn take_file(&mut self) -> Option<File> {
        match &mut self.slot {
            OutputSlot::File { file, .. } => file.take(),
            _ => None,
        }
    }

    /// Tests whether `token` names this option.
    ///
    /// `-h` and `--help` short-circuit with [`ArgError::HelpRequested`]
    /// whatever option is asked.
    pub fn check(&self, token: &str) -> Result<bool> {
        if token == HELP_SHORT || token == HELP_LONG {
            return Err(self.help_requested());
        }
        Ok(self.matches_long(token) || self.matches_short(token))
    }

    /// Blanks the tokens consumed by a match at `position`.
    ///
    /// A long name, or a short name of a value-bearing option, blanks the
    /// option token and its follow-on tokens. A flag's short name is removed
    /// from its cluster, and a cluster left as a bare `-` is blanked. Tokens
    /// that do not match are left alone.
    pub fn reduce(&self, position: usize, tokens: &mut [String]) {
        let Some(token) = tokens.get(position) else {
            return;
        };

        if self.matches_long(token) {
            self.blank(position, tokens);
            return;
        }
        if !self.matches_short(token) {
            return;
        }

        match (&self.slot, self.short.as_deref()) {
            (OutputSlot::Flag(_), Some(short)) => {
                let reduced = token.replace(short, "");
                trace!(option = %self.name(), position, remaining = %reduced, "Reduced flag cluster");
                tokens[position] = if reduced == "-" {
                    String::new()
                } else {
                    reduced
                };
            }
            _ => self.blank(position, tokens),
        }
    }

    /// Binds the follow-on `args` into the output slot.
    ///
    /// On error the parsed state is left as it was.
    pub fn parse(&mut self, args: &[String]) -> Result<()> {
        let name = self.name();
        if self.unique && self.parsed {
            return Err(ArgError::DuplicateOption { name });
        }

        if let Some(validator) = &self.validator {
            validator(args).map_err(ArgError::Validation)?;
        }

        match self.slot {
            OutputSlot::Help => return Err(self.help_requested()),
            OutputSlot::Flag(ref mut value) => *value = true,
            OutputSlot::Text(ref mut value) => {
                let token = single_argument(&name, args, "a string")?;
                if let Some(choices) = &self.choices {
                    if !choices.iter().any(|choice| choice == token) {
                        return Err(ArgError::InvalidChoice {
                            name,
                            value: token.to_string(),
                            allowed: choices.clone(),
                        });
                    }
                }
                *value = Some(token.to_string());
            }
            OutputSlot::File {
                ref mode,
                ref mut path,
                ref mut file,
            } => {
                let token = single_argument(&name, args, "a path to file")?;
                let opened = self.opener.open(Path::new(token), mode)?;
                *path = Some(PathBuf::from(token));
                *file = Some(opened);
            }
            OutputSlot::List(ref mut values) => {
                let token = single_argument(&name, args, "a string")?;
                values.push(token.to_string());
            }
        }

        self.parsed = true;
        debug!(option = %name, kind = %self.kind(), "Bound option");
        Ok(())
    }

    /// Rendered name: `-s`, `--long`, or `-s|--long`.
    pub fn name(&self) -> String {
        match (self.short.as_deref(), self.long.as_deref()) {
            (Some(short), Some(long)) => format!("-{short}|--{long}"),
            (None, Some(long)) => format!("--{long}"),
            (short, None) => format!("-{}", short.unwrap_or_default()),
        }
    }

    /// Usage fragment, bracketed unless the option is required.
    pub fn usage(&self) -> String {
        let mut result = self.name();
        match &self.slot {
            OutputSlot::Text(_) => match &self.choices {
                Some(choices) => {
                    result.push_str(" (");
                    result.push_str(&choices.join("|"));
                    result.push(')');
                }
                None => result.push_str(" \"<value>\""),
            },
            OutputSlot::File { .. } => result.push_str(" <file>"),
            OutputSlot::List(_) => result.push_str(" \"<string>\""),
            OutputSlot::Flag(_) | OutputSlot::Help => {}
        }
        if self.required {
            result
        } else {
            format!("[{result}]")
        }
    }

    /// Help screen line for this option.
    pub fn usage_entry(&self) -> UsageEntry {
        UsageEntry {
            fragment: self.usage(),
            short: self.short.clone(),
            long: self.long.clone(),
            help: self.help.clone(),
        }
    }

    /// Follow-on tokens for a match at `position`, clamped to the end of
    /// `tokens`.
    pub fn arguments_at<'a>(&self, position: usize, tokens: &'a [String]) -> &'a [String] {
        let start = (position + 1).min(tokens.len());
        let end = (position + 1 + self.arity).min(tokens.len());
        &tokens[start..end]
    }

    fn matches_long(&self, token: &str) -> bool {
        let Some(long) = self.long.as_deref() else {
            return false;
        };
        let bytes = token.as_bytes();
        bytes.len() > 2 && token.starts_with("--") && bytes[2] != MARKER && &token[2..] == long
    }

    fn matches_short(&self, token: &str) -> bool {
        let Some(short) = self.short.as_deref() else {
            return false;
        };
        let bytes = token.as_bytes();
        if bytes.len() <= 1 || bytes[0] != MARKER || bytes[1] == MARKER {
            return false;
        }
        let cluster = &token[1..];
        match self.slot {
            OutputSlot::Flag(_) => cluster.contains(short),
            _ => cluster == short,
        }
    }

    fn blank(&self, position: usize, tokens: &mut [String]) {
        let end = (position + 1 + self.arity).min(tokens.len());
        trace!(option = %self.name(), position, count = end - position, "Consumed tokens");
        for token in &mut tokens[position..end] {
            token.clear();
        }
    }

    fn help_requested(&self) -> ArgError {
        let usage = match &self.renderer {
            Some(renderer) => renderer.render_usage(),
            None => format!("usage: {}\n", self.usage()),
        };
        ArgError::HelpRequested { usage }
    }
}

fn single_argument<'a>(name: &str, args: &'a [String], what: &'static str) -> Result<&'a str> {
    match args {
        [] => Err(ArgError::ArityMismatch {
            name: name.to_string(),
            problem: ArityProblem::Missing(what),
        }),
        [token] => Ok(token),
        _ => Err(ArgError::ArityMismatch {
            name: name.to_string(),
            problem: ArityProblem::TooMany,
        }),
    }
}
