//! Declarative option declarations.
//!
//! A [`ScopeSpec`] describes a program and its options in YAML or JSON and
//! builds into a ready-to-parse [`Scope`].
//!
//! # Example YAML
//!
//! ```yaml
//! program: convert
//! description: Convert documents between formats.
//! options:
//!   - short: v
//!     long: verbose
//!     kind: flag
//!   - short: f
//!     long: format
//!     kind: selector
//!     choices: [json, yaml]
//!     required: true
//!   - short: o
//!     long: output
//!     kind: file
//!     file: { write: true, create: true, truncate: true, permissions: 420 }
//!   - long: tag
//!     kind: list
//!     help: Attach a tag, may repeat
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ArgError, ConfigError};
use crate::file::FileMode;
use crate::option::{OptionDef, SlotKind};
use crate::scope::Scope;
use crate::validate::validate_spec;

/// Declaration of one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Short name without marker (e.g., `"v"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Long name without markers (e.g., `"verbose"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    /// One of `flag`, `string`, `selector`, `file`, `list`, `help`.
    pub kind: String,
    /// Reject a parse pass that does not bind this option.
    #[serde(default)]
    pub required: bool,
    /// Reject a second occurrence.
    #[serde(default)]
    pub unique: bool,
    /// One-line description for the help screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Allowed values of a string option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// Open mode of a file option. Defaults to read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileMode>,
}

impl OptionSpec {
    /// Creates a declaration with no choices, help or constraints.
    pub fn new(short: Option<&str>, long: Option<&str>, kind: &str) -> Self {
        Self {
            short: short.map(String::from),
            long: long.map(String::from),
            kind: kind.to_string(),
            required: false,
            unique: false,
            help: None,
            choices: None,
            file: None,
        }
    }

    /// Restricts a string option to `choices`.
    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = Some(choices.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Sets the help screen description.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the option as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Name as it appears in messages, e.g. `-o|--out`.
    pub fn label(&self) -> String {
        let short = self.short.as_deref().filter(|s| !s.is_empty());
        let long = self.long.as_deref().filter(|l| !l.is_empty());
        match (short, long) {
            (Some(short), Some(long)) => format!("-{short}|--{long}"),
            (None, Some(long)) => format!("--{long}"),
            (short, None) => format!("-{}", short.unwrap_or_default()),
        }
    }

    /// Turns the declaration into a definition.
    ///
    /// # Errors
    ///
    /// Returns [`ArgError::UnsupportedKind`] for an unknown `kind`.
    pub fn build(&self) -> Result<OptionDef, ArgError> {
        let short = self.short.as_deref();
        let long = self.long.as_deref();
        let mut option = match self.kind.parse::<SlotKind>()? {
            SlotKind::Flag => OptionDef::flag(short, long),
            SlotKind::Text => OptionDef::text(short, long),
            SlotKind::File => OptionDef::file(short, long, self.file.unwrap_or_default()),
            SlotKind::List => OptionDef::list(short, long),
            SlotKind::Help => OptionDef::help(short, long),
        };
        if let Some(choices) = &self.choices {
            option = option.with_choices(choices.iter().cloned());
        }
        if let Some(help) = &self.help {
            option = option.with_help(help);
        }
        if self.required {
            option = option.required();
        }
        if self.unique {
            option = option.unique();
        }
        Ok(option)
    }
}

/// Declaration of one program level.
///
/// # Examples
///
/// ```
/// use argbind_core::ScopeSpec;
///
/// let spec = ScopeSpec::from_yaml_str(r#"
/// program: demo
/// options:
///   - { short: v, kind: flag }
///   - { long: out, kind: string, required: true }
/// "#).unwrap();
///
/// let mut scope = spec.build().unwrap();
/// scope.parse(["-v", "--out", "x"]).unwrap();
/// assert!(scope.find("v").unwrap().is_parsed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSpec {
    /// Program name shown on the usage line.
    pub program: String,
    /// Paragraph shown below the usage line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Options in declaration order, which is also parse order.
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl ScopeSpec {
    /// Creates a declaration with no options.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            description: None,
            options: Vec::new(),
        }
    }

    /// Loads a declaration file. `.json` files are read as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// or a parse error for the detected format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        debug!(path = %path.display(), json = is_json, "Loading option declarations");
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Parses a YAML declaration.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Parses a JSON declaration.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Serializes the declaration as YAML.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serializes the declaration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the declaration and builds a scope from it.
    ///
    /// # Errors
    ///
    /// Returns [`Invalid`](ConfigError::Invalid) for the first structural
    /// problem, or [`Option`](ConfigError::Option) wrapping
    /// [`ArgError::UnsupportedKind`] for an unknown option kind.
    pub fn build(&self) -> Result<Scope, ConfigError> {
        if let Some(error) = validate_spec(self).into_iter().next() {
            return Err(error.into());
        }

        let mut scope = match &self.description {
            Some(description) => Scope::with_description(&self.program, description),
            None => Scope::new(&self.program),
        };
        for option in &self.options {
            scope.add(option.build()?);
        }
        debug!(program = %self.program, options = self.options.len(), "Built scope");
        Ok(scope)
    }
}
