//! Option values and kinds
//!
//! Every value-bearing option is one of three kinds:
//!
//! - `Flag`: a boolean, rendered as `set(name).` / `clear(name).`
//! - `Int`: a bounded integer, rendered as `assign(name, value).`
//! - `Choice`: one string out of a finite ordered list, rendered as `assign(name, value).`
//!
//! The kind owns the validation logic; records never store a value that the
//! kind rejected.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::utils::{Error, OptionResult};

/// Largest integer accepted by the external programs. Used as the unbounded sentinel.
pub const INT_INF: i64 = i32::MAX as i64;

/// Current or default value of an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum OptionValue {
    Flag(bool),
    Int(i64),
    Choice(String),
}

impl OptionValue {
    /// Integer view of the value, `None` for flags and choices.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(value) => write!(f, "{}", value),
            OptionValue::Int(value) => write!(f, "{}", value),
            OptionValue::Choice(value) => f.write_str(value),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Choice(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Choice(value)
    }
}

/// Inclusive integer range of an `Int` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Kind of an option, including its range of valid values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptionKind {
    Flag,
    Int(IntRange),
    Choice(Vec<String>),
}

impl OptionKind {
    /// Short human name of the kind, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            OptionKind::Flag => "flag",
            OptionKind::Int(_) => "integer",
            OptionKind::Choice(_) => "choice",
        }
    }

    /// Whether `self` and `other` hold the same type of value (ranges are ignored).
    pub fn same_shape(&self, other: &OptionKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Read a value of this kind from text, eg. a command-line `name=value`.
    /// Flags accept `true`/`false`, `set`/`clear` and `1`/`0`. The value is
    /// not checked against the range or the choices.
    pub fn parse_value(&self, text: &str) -> Option<OptionValue> {
        let text = text.trim();
        match self {
            OptionKind::Flag => match text {
                "true" | "set" | "1" => Some(OptionValue::Flag(true)),
                "false" | "clear" | "0" => Some(OptionValue::Flag(false)),
                _ => None,
            },
            OptionKind::Int(_) => text.parse().ok().map(OptionValue::Int),
            OptionKind::Choice(_) => (!text.is_empty()).then(|| OptionValue::from(text)),
        }
    }

    /// Check that `value` is acceptable for an option of this kind named `name`.
    ///
    /// ```rust
    /// # use pmopt::value::{IntRange, OptionKind, OptionValue};
    /// let kind = OptionKind::Int(IntRange::new(-1, 10));
    /// assert!(kind.validate("max_given", &OptionValue::Int(3)).is_ok());
    /// assert!(kind.validate("max_given", &OptionValue::Int(11)).is_err());
    /// assert!(kind.validate("max_given", &OptionValue::Flag(true)).is_err());
    /// ```
    pub fn validate(&self, name: &str, value: &OptionValue) -> OptionResult<()> {
        match (self, value) {
            (OptionKind::Flag, OptionValue::Flag(_)) => Ok(()),
            (OptionKind::Int(range), OptionValue::Int(v)) => {
                if range.contains(*v) {
                    Ok(())
                } else {
                    Err(Error::OutOfRange {
                        name: name.to_string(),
                        value: *v,
                        min: range.min,
                        max: range.max,
                    })
                }
            }
            (OptionKind::Choice(choices), OptionValue::Choice(v)) => {
                if choices.iter().any(|choice| choice == v) {
                    Ok(())
                } else {
                    Err(Error::NotInChoices {
                        name: name.to_string(),
                        value: v.clone(),
                        choices: choices.clone(),
                    })
                }
            }
            (kind, found) => Err(Error::KindMismatch {
                name: name.to_string(),
                expected: kind.name(),
                found: found.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_validation() {
        let kind = OptionKind::Choice(vec!["lpo".into(), "rpo".into(), "kbo".into()]);
        assert!(kind.validate("order", &"kbo".into()).is_ok());

        let err = kind.validate("order", &"xyz".into()).unwrap_err();
        assert!(err.is_not_in_choices());
        assert!(err.is_range_error());
    }

    #[test]
    fn test_unbounded_sentinels() {
        let kind = OptionKind::Int(IntRange::new(-INT_INF, INT_INF));
        assert!(kind.validate("max_weight", &OptionValue::Int(INT_INF)).is_ok());
        assert!(kind.validate("max_weight", &OptionValue::Int(-INT_INF)).is_ok());
        assert!(
            kind.validate("max_weight", &OptionValue::Int(INT_INF + 1))
                .unwrap_err()
                .is_out_of_range()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(OptionValue::Flag(true).to_string(), "true");
        assert_eq!(OptionValue::Int(-1).to_string(), "-1");
        assert_eq!(OptionValue::from("lots").to_string(), "lots");
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(OptionKind::Flag.parse_value("set"), Some(OptionValue::Flag(true)));
        assert_eq!(OptionKind::Flag.parse_value("0"), Some(OptionValue::Flag(false)));
        assert_eq!(OptionKind::Flag.parse_value("maybe"), None);

        let int = OptionKind::Int(IntRange::new(0, 10));
        assert_eq!(int.parse_value(" 42 "), Some(OptionValue::Int(42)));
        assert_eq!(int.parse_value("x"), None);

        let choice = OptionKind::Choice(vec!["lpo".into()]);
        assert_eq!(choice.parse_value("rpo"), Some(OptionValue::from("rpo")));
        assert_eq!(choice.parse_value(""), None);
    }
}
