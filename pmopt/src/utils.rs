use strum::EnumIs;
use thiserror::Error;

use crate::{ProgramKind, value::OptionValue};

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, Error)]
pub enum Error {
    /// An integer option was given a value outside of its inclusive range.
    #[error("Value {value} for option `{name}` is outside of its range [{min} ... {max}].")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A choice option was given a string that is not one of its choices.
    #[error("Value `{value}` is not a valid choice for option `{name}`. Valid choices are {choices:?}.")]
    NotInChoices {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    /// The value does not have the kind of the option (eg., an integer for a flag).
    #[error("Option `{name}` expects a {expected} value, but `{found}` was given.")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: OptionValue,
    },

    /// No option with this name exists in the registry of the program.
    #[error("{program} has no option named `{name}`.")]
    UnknownOption { program: ProgramKind, name: String },

    /// The two records already share the same link group.
    #[error("Options `{first}` and `{second}` are already linked.")]
    AlreadyLinked { first: String, second: String },

    /// Only records of the same kind can be linked together.
    #[error("Options `{first}` and `{second}` have different kinds and cannot be linked.")]
    LinkKindMismatch { first: String, second: String },

    /// A dependency rule refers to a missing option or cannot apply to its target.
    #[error("Invalid dependency rule `{trigger}` -> `{target}` for {program}: {reason}")]
    InvalidRule {
        program: ProgramKind,
        trigger: String,
        target: String,
        reason: String,
    },

    /// An arithmetic effect overflowed while computing the value of a dependent option.
    #[error("Computing the value of option `{name}` overflowed.")]
    ArithmeticOverflow { name: String },
}

impl Error {
    /// Whether this error belongs to the range family (value rejected by the option kind).
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Error::OutOfRange { .. }
                | Error::NotInChoices { .. }
                | Error::KindMismatch { .. }
                | Error::ArithmeticOverflow { .. }
        )
    }
}

pub type OptionResult<T> = Result<T, Error>;
