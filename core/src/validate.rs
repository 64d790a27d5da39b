//! Declaration validation.
//!
//! Catches structural problems in a [`ScopeSpec`] before it is turned into
//! option definitions: options without names, names carrying their own
//! markers, duplicates, reserved help names, and misplaced choice sets.
//!
//! # Examples
//!
//! ```
//! use argbind_core::{OptionSpec, ScopeSpec, validate_spec};
//!
//! let mut spec = ScopeSpec::new("demo");
//! spec.options.push(OptionSpec::new(Some("v"), Some("verbose"), "flag"));
//! assert!(validate_spec(&spec).is_empty());
//!
//! // Invalid: short name written with its marker
//! spec.options.push(OptionSpec::new(Some("-q"), None, "flag"));
//! assert!(!validate_spec(&spec).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::config::{OptionSpec, ScopeSpec};
use crate::option::{HELP_LONG, HELP_SHORT, SlotKind};

/// Declaration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Program name is empty or whitespace-only.
    #[error("program name cannot be empty")]
    EmptyProgramName,
    /// An option has neither short nor long name.
    #[error("option must define a short or long name")]
    MissingOptionName,
    /// Short name is empty, starts with a marker, or contains whitespace.
    #[error("invalid short name: {0}")]
    InvalidShortName(String),
    /// Long name starts with a marker or contains whitespace or `=`.
    #[error("invalid long name: {0}")]
    InvalidLongName(String),
    /// Two options in the scope share a name.
    #[error("duplicate option name: {0}")]
    DuplicateName(String),
    /// `h` and `help` belong to the built-in help option.
    #[error("reserved option name: {0}")]
    ReservedName(String),
    /// Choices were declared on an option that is not a string option.
    #[error("choices only apply to string options: {0}")]
    ChoicesOnNonText(String),
    /// A selector declared an empty choice set.
    #[error("selector has no choices: {0}")]
    EmptyChoices(String),
}

/// Validates a scope declaration.
///
/// Stops at the first problem found. Unknown kinds are not reported here;
/// they surface as [`ArgError::UnsupportedKind`](crate::ArgError) when the
/// declaration is built.
pub fn validate_spec(spec: &ScopeSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if spec.program.trim().is_empty() {
        errors.push(ValidationError::EmptyProgramName);
        return errors;
    }

    errors.extend(validate_options(&spec.options));
    errors
}

/// Validates the options of one scope.
pub fn validate_options(options: &[OptionSpec]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for option in options {
        let short = option.short.as_deref().filter(|s| !s.is_empty());
        let long = option.long.as_deref().filter(|l| !l.is_empty());
        if short.is_none() && long.is_none() {
            errors.push(ValidationError::MissingOptionName);
            return errors;
        }

        if let Some(short) = short {
            if short.starts_with('-') || short.chars().any(char::is_whitespace) {
                errors.push(ValidationError::InvalidShortName(short.to_string()));
                return errors;
            }
            if HELP_SHORT.strip_prefix('-') == Some(short) {
                errors.push(ValidationError::ReservedName(HELP_SHORT.to_string()));
                return errors;
            }
            if !seen.insert(format!("-{short}")) {
                errors.push(ValidationError::DuplicateName(format!("-{short}")));
                return errors;
            }
        }

        if let Some(long) = long {
            if long.starts_with('-') || long.contains('=') || long.chars().any(char::is_whitespace)
            {
                errors.push(ValidationError::InvalidLongName(long.to_string()));
                return errors;
            }
            if HELP_LONG.strip_prefix("--") == Some(long) {
                errors.push(ValidationError::ReservedName(HELP_LONG.to_string()));
                return errors;
            }
            if !seen.insert(format!("--{long}")) {
                errors.push(ValidationError::DuplicateName(format!("--{long}")));
                return errors;
            }
        }

        let label = option.label();
        let kind = option.kind.parse::<SlotKind>().ok();
        match (&option.choices, kind) {
            (Some(_), Some(kind)) if kind != SlotKind::Text => {
                errors.push(ValidationError::ChoicesOnNonText(label));
                return errors;
            }
            (Some(choices), Some(SlotKind::Text)) if choices.is_empty() => {
                errors.push(ValidationError::EmptyChoices(label));
                return errors;
            }
            (None, Some(SlotKind::Text)) if option.kind.trim().eq_ignore_ascii_case("selector") => {
                errors.push(ValidationError::EmptyChoices(label));
                return errors;
            }
            _ => {}
        }
    }

    errors
}
