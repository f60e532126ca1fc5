//! Dependency rules
//!
//! A rule says: when option `trigger` changes and its new value satisfies
//! `condition`, give option `target` the value computed by `effect`. Rules are
//! plain data, declared once per program and looked up by trigger name.
use std::{collections::HashMap, fmt, str::FromStr};

use smallvec::SmallVec;

use crate::{
    utils::{Error, OptionResult},
    value::OptionValue,
};

/// Condition on the trigger's new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// The new value equals the given one.
    Equals(OptionValue),
    /// Any new value.
    Any,
    /// Integer value `>= 0`.
    NonNegative,
    /// Integer value `> 0`.
    Positive,
}

impl Condition {
    pub fn holds(&self, value: &OptionValue) -> bool {
        match self {
            Condition::Equals(expected) => expected == value,
            Condition::Any => true,
            Condition::NonNegative => value.as_int().is_some_and(|v| v >= 0),
            Condition::Positive => value.as_int().is_some_and(|v| v > 0),
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "any" => Ok(Condition::Any),
            ">=0" => Ok(Condition::NonNegative),
            ">0" => Ok(Condition::Positive),
            "true" => Ok(Condition::Equals(OptionValue::Flag(true))),
            "false" => Ok(Condition::Equals(OptionValue::Flag(false))),
            other => match other.parse::<i64>() {
                Ok(v) => Ok(Condition::Equals(OptionValue::Int(v))),
                Err(_) if !other.is_empty() => Ok(Condition::Equals(other.into())),
                Err(_) => Err("empty rule condition".to_string()),
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Equals(value) => fmt::Display::fmt(value, f),
            Condition::Any => f.write_str("any"),
            Condition::NonNegative => f.write_str(">=0"),
            Condition::Positive => f.write_str(">0"),
        }
    }
}

/// How the target's new value is computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Replace the target's value by a literal.
    Assign(OptionValue),
    /// Trigger value multiplied by `k`.
    Multiply(i64),
    /// Trigger value plus `k`.
    Add(i64),
}

impl Effect {
    /// Compute the target value from the trigger value. `target` only names
    /// the option in errors.
    pub fn apply(&self, target: &str, trigger_value: &OptionValue) -> OptionResult<OptionValue> {
        let arith = |f: fn(i64, i64) -> Option<i64>, k: i64| -> OptionResult<OptionValue> {
            let v = trigger_value.as_int().ok_or_else(|| Error::KindMismatch {
                name: target.to_string(),
                expected: "integer",
                found: trigger_value.clone(),
            })?;
            f(v, k).map(OptionValue::Int).ok_or_else(|| Error::ArithmeticOverflow {
                name: target.to_string(),
            })
        };

        match self {
            Effect::Assign(value) => Ok(value.clone()),
            Effect::Multiply(k) => arith(i64::checked_mul, *k),
            Effect::Add(k) => arith(i64::checked_add, *k),
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        !matches!(self, Effect::Assign(_))
    }
}

/// A dependency rule attached to a trigger option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub condition: Condition,
    pub target: String,
    pub effect: Effect,
}

/// Literal usable in `const` rule declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lit {
    Flag(bool),
    Int(i64),
    Choice(&'static str),
}

impl From<Lit> for OptionValue {
    fn from(value: Lit) -> Self {
        match value {
            Lit::Flag(v) => OptionValue::Flag(v),
            Lit::Int(v) => OptionValue::Int(v),
            Lit::Choice(v) => OptionValue::Choice(v.to_string()),
        }
    }
}

/// `const` form of [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    Is(Lit),
    Any,
    NonNegative,
    Positive,
}

/// `const` form of [`Effect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Then {
    Set(Lit),
    Multiply(i64),
    Add(i64),
}

/// Static declaration of a rule, as written in the program catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDecl {
    pub trigger: &'static str,
    pub when: When,
    pub target: &'static str,
    pub then: Then,
}

impl RuleDecl {
    pub const fn new(trigger: &'static str, when: When, target: &'static str, then: Then) -> Self {
        Self {
            trigger,
            when,
            target,
            then,
        }
    }

    pub fn to_rule(&self) -> Rule {
        let condition = match self.when {
            When::Is(lit) => Condition::Equals(lit.into()),
            When::Any => Condition::Any,
            When::NonNegative => Condition::NonNegative,
            When::Positive => Condition::Positive,
        };
        let effect = match self.then {
            Then::Set(lit) => Effect::Assign(lit.into()),
            Then::Multiply(k) => Effect::Multiply(k),
            Then::Add(k) => Effect::Add(k),
        };
        Rule {
            condition,
            target: self.target.to_string(),
            effect,
        }
    }
}

/// Immutable table of rules keyed by trigger name. Declaration order is kept
/// per trigger.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    by_trigger: HashMap<String, SmallVec<[Rule; 2]>>,
    len: usize,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, trigger: impl Into<String>, rule: Rule) {
        self.by_trigger.entry(trigger.into()).or_default().push(rule);
        self.len += 1;
    }

    /// Rules triggered by option `name`, in declaration order.
    pub fn rules_for(&self, name: &str) -> &[Rule] {
        self.by_trigger
            .get(name)
            .map(|rules| rules.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_rules(&self, name: &str) -> bool {
        self.by_trigger.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.by_trigger
            .iter()
            .flat_map(|(trigger, rules)| rules.iter().map(move |rule| (trigger.as_str(), rule)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_thresholds() {
        let non_negative: Condition = ">=0".parse().unwrap();
        let positive: Condition = ">0".parse().unwrap();

        assert!(non_negative.holds(&OptionValue::Int(0)));
        assert!(!non_negative.holds(&OptionValue::Int(-1)));
        assert!(!positive.holds(&OptionValue::Int(0)));
        assert!(positive.holds(&OptionValue::Int(1)));
        assert!(!positive.holds(&OptionValue::Flag(true)));
    }

    #[test]
    fn test_condition_literals() {
        assert_eq!("any".parse::<Condition>(), Ok(Condition::Any));
        assert_eq!(
            "true".parse::<Condition>(),
            Ok(Condition::Equals(OptionValue::Flag(true)))
        );
        assert_eq!(
            "-1".parse::<Condition>(),
            Ok(Condition::Equals(OptionValue::Int(-1)))
        );
        assert_eq!(
            "kbo".parse::<Condition>(),
            Ok(Condition::Equals("kbo".into()))
        );
    }

    #[test]
    fn test_effects() {
        let trigger = OptionValue::Int(2);
        assert_eq!(
            Effect::Multiply(3600).apply("max_seconds", &trigger),
            Ok(OptionValue::Int(7200))
        );
        assert_eq!(
            Effect::Add(5).apply("max_seconds", &trigger),
            Ok(OptionValue::Int(7))
        );
        assert!(
            Effect::Multiply(i64::MAX)
                .apply("max_seconds", &trigger)
                .unwrap_err()
                .is_arithmetic_overflow()
        );
    }

    #[test]
    fn test_rule_table_keeps_order() {
        let mut table = RuleTable::new();
        let decls = [
            RuleDecl::new("breadth_first", When::Is(Lit::Flag(true)), "age_part", Then::Set(Lit::Int(1))),
            RuleDecl::new("breadth_first", When::Is(Lit::Flag(true)), "weight_part", Then::Set(Lit::Int(0))),
        ];
        for decl in &decls {
            table.push(decl.trigger, decl.to_rule());
        }

        let targets: Vec<_> = table
            .rules_for("breadth_first")
            .iter()
            .map(|rule| rule.target.as_str())
            .collect();
        assert_eq!(targets, ["age_part", "weight_part"]);
        assert!(table.rules_for("lightest_first").is_empty());
        assert_eq!(table.len(), 2);
    }
}
