//! Error types for matching and binding.
//!
//! Every binding failure names the option through its rendered
//! [`name`](crate::OptionDef::name), so messages read like
//! `[-o|--out] must be followed by a string`.

use std::fmt;

use thiserror::Error;

/// Boxed error returned by caller-supplied validators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why an option received the wrong number of follow-on tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityProblem {
    /// No token followed the option. Holds the noun for the expected value.
    Missing(&'static str),
    /// More than one token followed the option.
    TooMany,
}

impl fmt::Display for ArityProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(what) => write!(f, "must be followed by {what}"),
            Self::TooMany => f.write_str("followed by too many arguments"),
        }
    }
}

/// Errors produced while matching, binding, or driving a parse pass.
///
/// [`HelpRequested`](ArgError::HelpRequested) is not a failure: it carries
/// the rendered usage text and asks the top-level driver to print it and
/// exit successfully. Use [`is_help`](ArgError::is_help) to tell it apart.
#[derive(Debug, Error)]
pub enum ArgError {
    /// A unique option was bound a second time.
    #[error("[{name}] can only be present once")]
    DuplicateOption { name: String },

    /// The caller-supplied validator rejected the raw tokens.
    #[error("{0}")]
    Validation(BoxError),

    /// Zero or several tokens where exactly one was required.
    #[error("[{name}] {problem}")]
    ArityMismatch { name: String, problem: ArityProblem },

    /// A selector value outside its declared choices.
    #[error("bad value for [{name}]. Allowed values are [{}]", .allowed.join(" "))]
    InvalidChoice {
        name: String,
        value: String,
        allowed: Vec<String>,
    },

    /// The file backing a file option could not be opened.
    #[error(transparent)]
    ResourceOpen(#[from] std::io::Error),

    /// A declaration named an output kind the binder does not know.
    #[error("unsupported type [{0}]")]
    UnsupportedKind(String),

    /// A required option never appeared in the token list.
    #[error("[{name}] is required")]
    MissingRequired { name: String },

    /// Tokens left over after every option of a scope consumed its share.
    #[error("unknown arguments {}", .tokens.join(" "))]
    UnknownArguments { tokens: Vec<String> },

    /// `-h` or `--help` was seen; holds the usage text to print.
    #[error("help requested")]
    HelpRequested { usage: String },
}

impl ArgError {
    /// Returns `true` for the help sentinel.
    pub fn is_help(&self) -> bool {
        matches!(self, Self::HelpRequested { .. })
    }

    /// Returns the usage text carried by the help sentinel.
    pub fn help_text(&self) -> Option<&str> {
        match self {
            Self::HelpRequested { usage } => Some(usage),
            _ => None,
        }
    }
}

/// Errors raised while loading or resolving option declarations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The declaration failed structural validation.
    #[error("invalid declaration: {0}")]
    Invalid(#[from] crate::validate::ValidationError),

    /// A declared option could not be turned into a definition.
    #[error(transparent)]
    Option(#[from] ArgError),
}

/// Convenience alias for results with [`ArgError`].
pub type Result<T> = std::result::Result<T, ArgError>;
