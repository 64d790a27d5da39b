//! Option matching and binding for command-line parsers.
//!
//! This crate is the layer of an argument parser that decides which raw
//! tokens belong to which declared option and turns them into typed values:
//!
//! - [`OptionDef`] — one declared option with short/long names, an
//!   [`OutputSlot`], and the per-position operations `check`, `reduce`,
//!   `parse`, `name` and `usage`.
//! - [`Scope`] — a flat driver owning the options of one program level and
//!   running a full pass over a token list.
//! - [`ScopeSpec`] — YAML/JSON declarations that build into a [`Scope`],
//!   checked by [`validate_spec`].
//! - [`FileOpener`] and [`UsageRenderer`] — capabilities supplied by the
//!   environment for file-backed options and help screens.
//!
//! Help is never printed from here. `-h` and `--help` come back as
//! [`ArgError::HelpRequested`] carrying the usage text, and the caller
//! decides how to print it and exit.
//!
//! # Example
//!
//! ```
//! use argbind_core::*;
//!
//! let mut scope = Scope::new("mycli");
//! scope.add(OptionDef::flag(Some("v"), Some("verbose")));
//! scope.add(OptionDef::text(Some("o"), Some("out")).required());
//!
//! scope.parse(["-v", "--out", "result.txt"]).unwrap();
//! assert_eq!(
//!     scope.find("out").unwrap().value(),
//!     BoundValue::Text(Some("result.txt".into()))
//! );
//!
//! let err = Scope::new("mycli").parse(["--help"]).unwrap_err();
//! assert!(err.is_help());
//! ```

mod config;
mod error;
mod file;
mod option;
mod scope;
mod usage;
mod validate;

pub use config::{OptionSpec, ScopeSpec};
pub use error::{ArgError, ArityProblem, BoxError, ConfigError, Result};
pub use file::{FileMode, FileOpener, SystemOpener};
pub use option::{
    BoundValue, HELP_LONG, HELP_SHORT, OptionDef, OutputSlot, SlotKind, Validator,
};
pub use scope::Scope;
pub use usage::{ScopeUsage, UsageEntry, UsageRenderer};
pub use validate::{ValidationError, validate_options, validate_spec};
