//! Option model of the Prover9/Mace4 front-end
//!
//! Typed option records grouped in per-program registries, link groups that
//! keep several records of one logical option in sync, and the dependency
//! engine that cascades a change to dependent options.
use strum::{Display, EnumIter, EnumString};

pub mod catalog;
pub mod directive;
pub mod record;
pub mod registry;
pub mod rules;
pub mod session;
pub mod utils;
pub mod value;

pub use utils::{Error as OptionError, OptionResult};

/// Target program of a registry, a job or an input block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, enum_map::Enum, Display, EnumIter, EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(ascii_case_insensitive)]
pub enum ProgramKind {
    /// Theorem prover, searches for proofs.
    Prover9,
    /// Model finder, searches for finite models.
    Mace4,
}
