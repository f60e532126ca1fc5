//! Option set registries
//!
//! Each program owns one [`OptionRegistry`]: an ordered list of named option
//! sets (one per panel), the rule table of the program, and the bookkeeping
//! needed to enumerate nondefault values. The records themselves live in the
//! arena of the owning [`crate::session::OptionSession`].
//!
//! Registries are described statically with [`RegistryDecl`] (see
//! [`crate::catalog`]) and instantiated by [`crate::session::OptionSession::install`].
use std::collections::HashMap;

use strum::{Display, EnumIs};

use crate::{
    ProgramKind,
    record::RecordKey,
    rules::{RuleDecl, RuleTable},
    value::{IntRange, OptionKind, OptionValue},
};

/// Column a group marker is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

/// An entry of an option set.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum OptionEntry {
    /// Presentation grouping only, carries no value.
    GroupMarker { title: String, column: Column },
    /// A value-bearing record.
    Record(RecordKey),
}

/// A named panel of options.
#[derive(Debug, Clone)]
pub struct OptionSet {
    pub(crate) name: String,
    pub(crate) entries: Vec<OptionEntry>,
}

impl OptionSet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    /// Value-bearing records of this set, in display order.
    pub fn records(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            OptionEntry::Record(key) => Some(*key),
            OptionEntry::GroupMarker { .. } => None,
        })
    }
}

/// Options and rules of one program.
#[derive(Debug, Clone)]
pub struct OptionRegistry {
    pub(crate) program: ProgramKind,
    pub(crate) sets: Vec<OptionSet>,
    pub(crate) rules: RuleTable,
    pub(crate) always_emit: Vec<String>,
    pub(crate) basic_set_last: bool,
    /// First record of each name, in set order.
    pub(crate) by_name: HashMap<String, RecordKey>,
    pub(crate) externals: Vec<RecordKey>,
}

impl OptionRegistry {
    pub(crate) fn empty(program: ProgramKind) -> Self {
        Self {
            program,
            sets: Vec::new(),
            rules: RuleTable::new(),
            always_emit: Vec::new(),
            basic_set_last: false,
            by_name: HashMap::new(),
            externals: Vec::new(),
        }
    }

    pub fn program(&self) -> ProgramKind {
        self.program
    }

    pub fn sets(&self) -> &[OptionSet] {
        &self.sets
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|set| set.name.as_str())
    }

    pub fn set_index(&self, name: &str) -> Option<usize> {
        self.sets.iter().position(|set| set.name == name)
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Record for `name`, the first occurrence in set order.
    pub fn lookup(&self, name: &str) -> Option<RecordKey> {
        self.by_name.get(name).copied()
    }

    /// Options written to the program input even when they hold their default.
    pub fn always_emit(&self) -> &[String] {
        &self.always_emit
    }

    /// Every record of the registry: set records in order, then external records.
    pub fn records(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.sets
            .iter()
            .flat_map(|set| set.records())
            .chain(self.externals.iter().copied())
    }

    /// Sets in the order their nondefault values are collected.
    pub(crate) fn emit_order(&self) -> impl Iterator<Item = &OptionSet> {
        let (head, tail) = if self.basic_set_last && !self.sets.is_empty() {
            (&self.sets[1..], &self.sets[..1])
        } else {
            (&self.sets[..], &self.sets[..0])
        };
        head.iter().chain(tail.iter())
    }
}

/// `const` form of an option kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindDecl {
    Flag,
    Int { min: i64, max: i64 },
    Choice(&'static [&'static str]),
}

impl KindDecl {
    pub fn to_kind(&self) -> OptionKind {
        match self {
            KindDecl::Flag => OptionKind::Flag,
            KindDecl::Int { min, max } => OptionKind::Int(IntRange::new(*min, *max)),
            KindDecl::Choice(choices) => {
                OptionKind::Choice(choices.iter().map(|c| c.to_string()).collect())
            }
        }
    }
}

/// Static declaration of a value-bearing option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDecl {
    pub name: &'static str,
    pub kind: KindDecl,
    pub default: crate::rules::Lit,
    pub tip: &'static str,
}

impl OptionDecl {
    pub fn default_value(&self) -> OptionValue {
        self.default.into()
    }
}

/// Static declaration of an option set entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDecl {
    Group(&'static str, Column),
    Option(OptionDecl),
}

/// Declares a flag option.
pub const fn flag(name: &'static str, default: bool, tip: &'static str) -> EntryDecl {
    EntryDecl::Option(OptionDecl {
        name,
        kind: KindDecl::Flag,
        default: crate::rules::Lit::Flag(default),
        tip,
    })
}

/// Declares an integer option with inclusive range `[min, max]`.
pub const fn int(name: &'static str, default: i64, min: i64, max: i64, tip: &'static str) -> EntryDecl {
    EntryDecl::Option(OptionDecl {
        name,
        kind: KindDecl::Int { min, max },
        default: crate::rules::Lit::Int(default),
        tip,
    })
}

/// Declares a choice option.
pub const fn choice(
    name: &'static str,
    default: &'static str,
    choices: &'static [&'static str],
    tip: &'static str,
) -> EntryDecl {
    EntryDecl::Option(OptionDecl {
        name,
        kind: KindDecl::Choice(choices),
        default: crate::rules::Lit::Choice(default),
        tip,
    })
}

/// Declares a group marker.
pub const fn group(title: &'static str, column: Column) -> EntryDecl {
    EntryDecl::Group(title, column)
}

/// Static declaration of a named option set.
#[derive(Debug, Clone, Copy)]
pub struct SetDecl {
    pub name: &'static str,
    pub entries: &'static [EntryDecl],
}

/// Static declaration of a whole registry.
#[derive(Debug, Clone, Copy)]
pub struct RegistryDecl {
    pub program: ProgramKind,
    pub sets: &'static [SetDecl],
    pub rules: &'static [RuleDecl],
    pub always_emit: &'static [&'static str],
    /// Collect the first set last when enumerating nondefault options.
    pub basic_set_last: bool,
}
