//! Option directives
//!
//! Options are handed to the programs as directives in their input language:
//! `set(name).` and `clear(name).` for flags, `assign(name, value).` for
//! integer and choice options. This module renders the nondefault options of
//! a session and loads directives back into it.
use std::{fmt, sync::LazyLock};

use log::debug;
use regex::Regex;
use strum::{Display, EnumIs};

use crate::{
    ProgramKind,
    session::OptionSession,
    value::OptionValue,
};

/// Command used to express an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum DirectiveKind {
    Set,
    Clear,
    Assign,
}

/// A single option directive, eg. `assign(max_seconds, 60).`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directive {
    name: String,
    value: OptionValue,
}

impl Directive {
    pub fn new(name: impl Into<String>, value: OptionValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn kind(&self) -> DirectiveKind {
        match self.value {
            OptionValue::Flag(true) => DirectiveKind::Set,
            OptionValue::Flag(false) => DirectiveKind::Clear,
            _ => DirectiveKind::Assign,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &OptionValue {
        &self.value
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            DirectiveKind::Assign => write!(f, "assign({}, {}).", self.name, self.value),
            kind => write!(f, "{}({}).", kind, self.name),
        }
    }
}

/// Render directives one per line, indented by two spaces.
pub fn render_directives(directives: &[Directive]) -> String {
    directives
        .iter()
        .map(|directive| format!("  {}\n", directive))
        .collect()
}

static FLAG_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(set|clear)\s*\(\s*([A-Za-z0-9_]+)\s*\)$").expect("valid flag pattern"));
static ASSIGN_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^assign\s*\(\s*([A-Za-z0-9_]+)\s*,\s*([A-Za-z0-9_+\-]+)\s*\)$").expect("valid assign pattern")
});

/// Parse one command (without its terminating period).
pub fn parse_directive(command: &str) -> Option<Directive> {
    let command = command.trim();
    if let Some(caps) = FLAG_COMMAND.captures(command) {
        let value = &caps[1] == "set";
        return Some(Directive::new(&caps[2], OptionValue::Flag(value)));
    }
    if let Some(caps) = ASSIGN_COMMAND.captures(command) {
        let raw = &caps[2];
        let value = match raw.parse::<i64>() {
            Ok(v) => OptionValue::Int(v),
            Err(_) => OptionValue::Choice(raw.to_string()),
        };
        return Some(Directive::new(&caps[1], value));
    }
    None
}

/// Non-empty commands of `text`, split on periods. Text after the last period
/// is not a command and is ignored.
fn commands(text: &str) -> impl Iterator<Item = &str> {
    let terminated = text.rsplit_once('.').map_or("", |(head, _)| head);
    terminated
        .split('.')
        .map(str::trim)
        .filter(|command| !command.is_empty())
}

impl OptionSession {
    fn apply_command(&mut self, program: ProgramKind, command: &str, with_dependencies: bool) -> bool {
        let Some(directive) = parse_directive(command) else {
            return false;
        };
        let Some(key) = self.lookup(program, directive.name()) else {
            return false;
        };

        let value = directive.value;
        let result = if with_dependencies {
            self.apply_change(key, value)
        } else {
            self.apply_shared(key, value)
        };
        match result {
            Ok(_) => true,
            Err(err) => {
                debug!("Directive `{}` not applied to {}: {}", command, program, err);
                false
            }
        }
    }

    /// Apply the option directives found in `text` to the registry of `program`.
    ///
    /// Returns the commands that were not handled (unparsable, unknown option,
    /// or rejected value), one `"<command>.\n"` per line.
    pub fn apply_directives(&mut self, program: ProgramKind, text: &str, with_dependencies: bool) -> String {
        let mut remainder = String::new();
        for command in commands(text) {
            if !self.apply_command(program, command, with_dependencies) {
                remainder.push_str(command);
                remainder.push_str(".\n");
            }
        }
        remainder
    }

    /// Apply `text` to both registries, returning the commands neither handled.
    pub fn apply_directives_either(&mut self, text: &str, with_dependencies: bool) -> String {
        let mut remainder = String::new();
        for command in commands(text) {
            let prover = self.apply_command(ProgramKind::Prover9, command, with_dependencies);
            let finder = self.apply_command(ProgramKind::Mace4, command, with_dependencies);
            if !prover && !finder {
                remainder.push_str(command);
                remainder.push_str(".\n");
            }
        }
        remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Directive::new("auto", true.into()).to_string(), "set(auto).");
        assert_eq!(Directive::new("auto", false.into()).to_string(), "clear(auto).");
        assert_eq!(
            Directive::new("order", "kbo".into()).to_string(),
            "assign(order, kbo)."
        );
        assert_eq!(
            render_directives(&[Directive::new("max_seconds", 60i64.into())]),
            "  assign(max_seconds, 60).\n"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            parse_directive(" assign( max_weight , -5 )"),
            Some(Directive::new("max_weight", OptionValue::Int(-5)))
        );
        assert_eq!(
            parse_directive("clear(print_given)"),
            Some(Directive::new("print_given", false.into()))
        );
        assert_eq!(
            parse_directive("assign(stats, some)").map(|d| d.kind()),
            Some(DirectiveKind::Assign)
        );
        assert_eq!(
            parse_directive("set (auto2)"),
            Some(Directive::new("auto2", true.into()))
        );
        assert_eq!(
            parse_directive("assign (max_weight, 7)"),
            Some(Directive::new("max_weight", OptionValue::Int(7)))
        );
        assert_eq!(parse_directive("formulas(sos)"), None);
        assert_eq!(parse_directive("set(a, b)"), None);
    }

    #[test]
    fn test_commands_need_a_period() {
        assert_eq!(
            commands("set(a).\n assign(b, 1). clear(c").collect::<Vec<_>>(),
            ["set(a)", "assign(b, 1)"]
        );
        assert_eq!(commands("clear(auto)").count(), 0);
        assert_eq!(commands("").count(), 0);
    }
}
