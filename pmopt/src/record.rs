use slotmap::new_key_type;
use smallvec::SmallVec;
use strum::{Display, EnumIs};

use crate::{
    ProgramKind,
    value::{OptionKind, OptionValue},
};

new_key_type! {
    /// Stable handle of an [`OptionRecord`] inside an [`crate::session::OptionSession`].
    pub struct RecordKey;

    /// Stable handle of a [`LinkGroup`].
    pub struct LinkKey;
}

/// One on-screen representation of a configurable parameter.
///
/// Several records may represent the same logical option (the same option
/// shown in two panels, or shared between both programs). Such records
/// belong to the same [`LinkGroup`], which holds their single current value.
#[derive(Debug, Clone)]
pub struct OptionRecord {
    pub(crate) name: String,
    pub(crate) kind: OptionKind,
    pub(crate) default: OptionValue,
    pub(crate) tip: String,
    pub(crate) program: ProgramKind,
    pub(crate) link: LinkKey,
    pub(crate) external: bool,
}

impl OptionRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &OptionKind {
        &self.kind
    }

    pub fn default(&self) -> &OptionValue {
        &self.default
    }

    /// Tooltip describing the option.
    pub fn tip(&self) -> &str {
        &self.tip
    }

    /// Registry owning this record. Its rule table applies to the record.
    pub fn program(&self) -> ProgramKind {
        self.program
    }

    pub fn link(&self) -> LinkKey {
        self.link
    }

    /// Whether the record lives outside of the registry's option sets.
    pub fn is_external(&self) -> bool {
        self.external
    }
}

/// Set of records that always carry the same value.
#[derive(Debug, Clone)]
pub struct LinkGroup {
    pub(crate) value: OptionValue,
    pub(crate) members: SmallVec<[RecordKey; 2]>,
}

impl LinkGroup {
    pub fn value(&self) -> &OptionValue {
        &self.value
    }

    pub fn members(&self) -> &[RecordKey] {
        &self.members
    }
}

/// How the label of a record should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum LabelState {
    /// Default value, no dependent options.
    #[strum(serialize = "default")]
    Default,
    /// Default value, but changing it cascades to other options.
    #[strum(serialize = "default (has dependents)")]
    DefaultWithDependents,
    /// Value differs from the default.
    #[strum(serialize = "nondefault")]
    Nondefault,
}
