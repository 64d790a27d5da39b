//! Flat parse driver.
//!
//! A [`Scope`] owns the option definitions of one program level and runs a
//! parse pass over a token list. For each option in declaration order it
//! scans every live token, binds the follow-on tokens of each match and then
//! blanks what was consumed. Tokens nobody claimed are reported back.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::{ArgError, Result};
use crate::option::{BoundValue, OptionDef, SlotKind};
use crate::usage::{ScopeUsage, UsageRenderer};

/// Option definitions of one program level.
///
/// Every scope starts with a `-h|--help` option.
///
/// # Examples
///
/// ```
/// use argbind_core::{BoundValue, OptionDef, Scope};
///
/// let mut scope = Scope::new("demo");
/// scope.add(OptionDef::flag(Some("v"), Some("verbose")));
/// scope.add(OptionDef::list(Some("t"), Some("tag")));
///
/// let rest = scope
///     .parse_known(["-v", "-t", "a", "input.txt", "--tag", "b"])
///     .unwrap();
///
/// assert_eq!(rest, vec!["input.txt"]);
/// assert_eq!(
///     scope.find("tag").unwrap().value(),
///     BoundValue::List(vec!["a".into(), "b".into()])
/// );
/// ```
#[derive(Debug)]
pub struct Scope {
    usage: Rc<ScopeUsage>,
    options: Vec<OptionDef>,
}

impl Scope {
    /// Creates a scope holding only the help option.
    pub fn new(program: &str) -> Self {
        Self::from_usage(ScopeUsage::new(program))
    }

    /// Creates a scope whose help screen includes `description`.
    pub fn with_description(program: &str, description: &str) -> Self {
        Self::from_usage(ScopeUsage::new(program).with_description(description))
    }

    fn from_usage(usage: ScopeUsage) -> Self {
        let mut scope = Self {
            usage: Rc::new(usage),
            options: Vec::new(),
        };
        scope.add(OptionDef::help(Some("h"), Some("help")).with_help("Print help information"));
        scope
    }

    /// Declares an option and returns its index.
    pub fn add(&mut self, option: OptionDef) -> usize {
        let renderer: Rc<dyn UsageRenderer> = self.usage.clone();
        let option = option.with_renderer(renderer);
        self.usage.push(option.usage_entry());
        self.options.push(option);
        self.options.len() - 1
    }

    /// Program name shown on the usage line.
    pub fn program(&self) -> &str {
        self.usage.program()
    }

    /// Declared options in parse order, help first.
    pub fn options(&self) -> &[OptionDef] {
        &self.options
    }

    /// Option at the index returned by [`add`](Self::add).
    pub fn option(&self, index: usize) -> Option<&OptionDef> {
        self.options.get(index)
    }

    /// Mutable access to the option at `index`.
    pub fn option_mut(&mut self, index: usize) -> Option<&mut OptionDef> {
        self.options.get_mut(index)
    }

    /// Finds an option by name.
    ///
    /// `-v` only matches a short name and `--v` only a long one. A bare `v`
    /// matches either and returns the first declared.
    pub fn find(&self, name: &str) -> Option<&OptionDef> {
        self.options.iter().find(|o| has_name(o, name))
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, name: &str) -> Option<&mut OptionDef> {
        self.options.iter_mut().find(|o| has_name(o, name))
    }

    /// Full help screen.
    pub fn usage(&self) -> String {
        self.usage.render()
    }

    /// Runs a pass over `tokens` in place, leaving unclaimed tokens intact and
    /// consumed ones blank.
    ///
    /// # Errors
    ///
    /// Stops at the first binding error, at the first required option that
    /// did not appear, or with [`ArgError::HelpRequested`] when `-h` or
    /// `--help` is seen.
    pub fn parse_in_place(&mut self, tokens: &mut [String]) -> Result<()> {
        let program = self.usage.program().to_string();
        for option in &mut self.options {
            for position in 0..tokens.len() {
                if tokens[position].is_empty() || !option.check(&tokens[position])? {
                    continue;
                }
                debug!(program = %program, option = %option.name(), position, "Matched option");
                let args = option.arguments_at(position, tokens).to_vec();
                option.parse(&args)?;
                option.reduce(position, tokens);
            }

            if option.is_required() && !option.is_parsed() {
                return Err(ArgError::MissingRequired {
                    name: option.name(),
                });
            }
        }
        Ok(())
    }

    /// Runs a pass and returns the tokens no option claimed, in order.
    pub fn parse_known<I, S>(&mut self, args: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        self.parse_in_place(&mut tokens)?;
        tokens.retain(|token| !token.is_empty());
        Ok(tokens)
    }

    /// Runs a pass and rejects tokens no option claimed.
    pub fn parse<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rest = self.parse_known(args)?;
        if rest.is_empty() {
            Ok(())
        } else {
            Err(ArgError::UnknownArguments { tokens: rest })
        }
    }

    /// Bound values keyed by `--long`, or `-short` when there is no long
    /// name. Help options are skipped.
    ///
    /// Keys keep their markers so a short `v` and a long `v` on different
    /// options stay distinct.
    pub fn values(&self) -> BTreeMap<String, BoundValue> {
        self.options
            .iter()
            .filter(|o| o.kind() != SlotKind::Help)
            .filter_map(|o| {
                let key = match (o.long(), o.short()) {
                    (Some(long), _) => format!("--{long}"),
                    (None, Some(short)) => format!("-{short}"),
                    (None, None) => return None,
                };
                Some((key, o.value()))
            })
            .collect()
    }
}

fn has_name(option: &OptionDef, name: &str) -> bool {
    if let Some(long) = name.strip_prefix("--") {
        option.long() == Some(long)
    } else if let Some(short) = name.strip_prefix('-') {
        option.short() == Some(short)
    } else {
        option.short() == Some(name) || option.long() == Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileMode;

    fn demo_scope() -> Scope {
        let mut scope = Scope::with_description("demo", "A demo program.");
        scope.add(OptionDef::flag(Some("a"), None));
        scope.add(OptionDef::flag(Some("b"), Some("bee")));
        scope.add(
            OptionDef::text(Some("o"), Some("out"))
                .required()
                .with_help("Output name"),
        );
        scope.add(OptionDef::selector(None, Some("mode"), &["fast", "slow"]));
        scope
    }

    #[test]
    fn test_parse_binds_all_kinds() {
        let mut scope = demo_scope();
        scope
            .parse(["-ab", "--out", "x", "--mode", "slow"])
            .unwrap();

        let values = scope.values();
        assert_eq!(values["-a"], BoundValue::Flag(true));
        assert_eq!(values["--bee"], BoundValue::Flag(true));
        assert_eq!(values["--out"], BoundValue::Text(Some("x".into())));
        assert_eq!(values["--mode"], BoundValue::Text(Some("slow".into())));
        assert!(!values.contains_key("--help"));
    }

    #[test]
    fn test_short_and_long_sharing_text_stay_distinct() {
        let mut scope = Scope::new("demo");
        scope.add(OptionDef::flag(Some("v"), None));
        scope.add(OptionDef::text(None, Some("v")));
        scope.parse(["-v", "--v", "x"]).unwrap();

        let values = scope.values();
        assert_eq!(values.len(), 2);
        assert_eq!(values["-v"], BoundValue::Flag(true));
        assert_eq!(values["--v"], BoundValue::Text(Some("x".into())));

        assert_eq!(scope.find("-v").unwrap().kind(), SlotKind::Flag);
        assert_eq!(scope.find("--v").unwrap().kind(), SlotKind::Text);
        assert_eq!(scope.find_mut("--v").unwrap().name(), "--v");
        assert_eq!(scope.find("v").unwrap().name(), "-v");
    }

    #[test]
    fn test_parse_in_place_blanks_consumed_tokens() {
        let mut scope = demo_scope();
        let mut tokens: Vec<String> = ["-ac", "-o", "x", "tail"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        scope.parse_in_place(&mut tokens).unwrap();
        assert_eq!(tokens, vec!["-c", "", "", "tail"]);
    }

    #[test]
    fn test_missing_required() {
        let mut scope = demo_scope();
        let err = scope.parse(["-a"]).unwrap_err();
        assert!(matches!(err, ArgError::MissingRequired { .. }));
        assert_eq!(err.to_string(), "[-o|--out] is required");
    }

    #[test]
    fn test_unknown_arguments() {
        let mut scope = demo_scope();
        let err = scope.parse(["-o", "x", "extra", "--nope"]).unwrap_err();
        assert_eq!(err.to_string(), "unknown arguments extra --nope");
    }

    #[test]
    fn test_help_short_circuits_pass() {
        let mut scope = demo_scope();
        let err = scope.parse(["-a", "--mode", "bogus", "-h"]).unwrap_err();
        assert!(err.is_help());
        let usage = err.help_text().unwrap();
        assert!(usage.starts_with(
            "usage: demo [-h|--help] [-a] [-b|--bee] -o|--out \"<value>\" [--mode (fast|slow)]\n"
        ));
        assert!(usage.contains("A demo program."));
        assert!(usage.contains("--out   Output name"));
        // Nothing was bound before the help token was seen.
        assert!(!scope.find("a").unwrap().is_parsed());
    }

    #[test]
    fn test_options_declared_later_appear_in_help() {
        let mut scope = Scope::new("late");
        scope.add(OptionDef::flag(Some("q"), None));
        let first = scope.find("q").unwrap().check("--help").unwrap_err();
        scope.add(OptionDef::flag(Some("z"), None));
        let second = scope.find("q").unwrap().check("--help").unwrap_err();

        assert!(!first.help_text().unwrap().contains("[-z]"));
        assert!(second.help_text().unwrap().contains("[-z]"));
    }

    #[test]
    fn test_binding_error_stops_pass() {
        let mut scope = demo_scope();
        let err = scope.parse(["-o", "x", "--mode", "medium"]).unwrap_err();
        assert!(matches!(err, ArgError::InvalidChoice { .. }));
    }

    #[test]
    fn test_value_option_at_end_reports_missing_value() {
        let mut scope = demo_scope();
        let err = scope.parse(["--out"]).unwrap_err();
        assert_eq!(err.to_string(), "[-o|--out] must be followed by a string");
    }

    #[test]
    fn test_unique_option_repeated() {
        let mut scope = Scope::new("demo");
        scope.add(OptionDef::text(Some("n"), None).unique());
        let err = scope.parse(["-n", "1", "-n", "2"]).unwrap_err();
        assert!(matches!(err, ArgError::DuplicateOption { .. }));
    }

    #[test]
    fn test_repeated_list_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let path_str = path.to_str().unwrap().to_string();

        let mut scope = Scope::new("demo");
        scope.add(OptionDef::list(Some("I"), Some("include")));
        scope.add(OptionDef::file(Some("w"), None, FileMode::write_truncate()));
        let rest = scope
            .parse_known(vec![
                "-I".to_string(),
                "a".to_string(),
                "-w".to_string(),
                path_str.clone(),
                "--include".to_string(),
                "b".to_string(),
            ])
            .unwrap();

        assert!(rest.is_empty());
        assert_eq!(
            scope.find("include").unwrap().value(),
            BoundValue::List(vec!["a".into(), "b".into()])
        );
        assert!(path.exists());
        assert!(scope.find_mut("w").unwrap().take_file().is_some());
    }

    #[test]
    fn test_find_and_index() {
        let mut scope = Scope::new("demo");
        let index = scope.add(OptionDef::flag(Some("v"), Some("verbose")));
        assert_eq!(index, 1);
        assert_eq!(scope.option(index).unwrap().name(), "-v|--verbose");
        assert!(scope.find("v").is_some());
        assert!(scope.find("verbose").is_some());
        assert!(scope.find("-v").is_some());
        assert!(scope.find("--verbose").is_some());
        assert!(scope.find("--v").is_none());
        assert!(scope.find("-verbose").is_none());
        assert_eq!(scope.options().len(), 2);
        assert_eq!(scope.program(), "demo");
        assert!(scope.option_mut(7).is_none());
    }
}
