//! Option session and dependency engine
//!
//! An [`OptionSession`] is the configuration of one front-end session: an
//! arena of [`OptionRecord`]s, an arena of [`LinkGroup`]s (the records that
//! must always agree), and one [`OptionRegistry`] per program.
//!
//! All mutation goes through [`OptionSession::apply_change`] (or its variants)
//! which validates the new value, stores it once in the link group of the
//! record, and then cascades through the dependency rules of the owning
//! registry:
//!
//! ```rust
//! # use pmopt::{ProgramKind, session::OptionSession, value::OptionValue};
//! let mut session = OptionSession::standard().unwrap();
//! let max_hours = session.lookup(ProgramKind::Prover9, "max_hours").unwrap();
//! session.apply_change(max_hours, OptionValue::Int(2)).unwrap();
//! assert_eq!(
//!     session.value_of(ProgramKind::Prover9, "max_seconds"),
//!     Some(&OptionValue::Int(7200))
//! );
//! ```
//!
//! # Termination
//! Rules are evaluated recursively without cycle detection. A change that
//! leaves a value untouched does not cascade, which is enough for the rule
//! sets of the built-in catalogs. Arbitrary rule sets may still loop.
use std::collections::HashSet;

use enum_map::EnumMap;
use log::{debug, trace, warn};
use slotmap::SlotMap;
use smallvec::smallvec;

use crate::{
    ProgramKind,
    directive::Directive,
    record::{LabelState, LinkGroup, LinkKey, OptionRecord, RecordKey},
    registry::{EntryDecl, OptionEntry, OptionRegistry, OptionSet, RegistryDecl},
    rules::{Condition, Effect, Rule},
    utils::{Error, OptionResult},
    value::{OptionKind, OptionValue},
};

/// A cascaded update that was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUpdate {
    pub trigger: String,
    pub target: String,
    pub error: Error,
}

/// Outcome of a change: the records whose value changed (including linked
/// records) and the cascaded updates that were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    pub changed: Vec<RecordKey>,
    pub skipped: Vec<SkippedUpdate>,
}

impl ChangeReport {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.skipped.is_empty()
    }

    pub fn contains(&self, key: RecordKey) -> bool {
        self.changed.contains(&key)
    }

    fn mark(&mut self, key: RecordKey) {
        if !self.changed.contains(&key) {
            self.changed.push(key);
        }
    }

    fn merge(&mut self, other: ChangeReport) {
        for key in other.changed {
            self.mark(key);
        }
        self.skipped.extend(other.skipped);
    }
}

/// Which records [`OptionSession::reset_to_default`] restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Every record of both registries.
    Session,
    /// Every record of one registry.
    Registry(ProgramKind),
    /// The records of one option set, by index.
    Set(ProgramKind, usize),
    /// A single record.
    Record(RecordKey),
}

/// Records, link groups and registries of one configuration session.
#[derive(Debug, Clone)]
pub struct OptionSession {
    records: SlotMap<RecordKey, OptionRecord>,
    links: SlotMap<LinkKey, LinkGroup>,
    registries: EnumMap<ProgramKind, OptionRegistry>,
}

impl Default for OptionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionSession {
    /// Create a session with two empty registries.
    pub fn new() -> Self {
        Self {
            records: SlotMap::with_key(),
            links: SlotMap::with_key(),
            registries: EnumMap::from_fn(OptionRegistry::empty),
        }
    }

    /// Create a session with the built-in catalogs of both programs, with
    /// `prolog_style_variables` shared between them.
    pub fn standard() -> OptionResult<Self> {
        let mut session = Self::new();
        session.install(crate::catalog::prover9())?;
        session.install(crate::catalog::mace4())?;
        session.link_by_names(
            ProgramKind::Prover9,
            ProgramKind::Mace4,
            &["prolog_style_variables"],
        )?;
        Ok(session)
    }

    /// Instantiate the registry described by `decl`, replacing the previous
    /// registry of the same program.
    ///
    /// Records of the same name appearing in several sets are linked, and every
    /// rule is validated against the options it refers to.
    ///
    /// On error the program is left with an empty registry.
    pub fn install(&mut self, decl: &RegistryDecl) -> OptionResult<()> {
        let program = decl.program;
        let previous = std::mem::replace(
            &mut self.registries[program],
            OptionRegistry::empty(program),
        );
        for key in previous.records().collect::<Vec<_>>() {
            self.remove_record(key);
        }

        let mut inserted = Vec::new();
        match self.build_registry(decl, &mut inserted) {
            Ok(registry) => {
                debug!(
                    "Installed {} registry: {} sets, {} options, {} rules.",
                    program,
                    registry.sets.len(),
                    registry.by_name.len(),
                    registry.rules.len()
                );
                self.registries[program] = registry;
                Ok(())
            }
            Err(err) => {
                for key in inserted {
                    self.remove_record(key);
                }
                Err(err)
            }
        }
    }

    fn build_registry(
        &mut self,
        decl: &RegistryDecl,
        inserted: &mut Vec<RecordKey>,
    ) -> OptionResult<OptionRegistry> {
        let program = decl.program;
        let mut registry = OptionRegistry::empty(program);
        registry.basic_set_last = decl.basic_set_last;

        for set_decl in decl.sets {
            let mut entries = Vec::with_capacity(set_decl.entries.len());
            for entry in set_decl.entries {
                match entry {
                    EntryDecl::Group(title, column) => entries.push(OptionEntry::GroupMarker {
                        title: title.to_string(),
                        column: *column,
                    }),
                    EntryDecl::Option(option) => {
                        let kind = option.kind.to_kind();
                        let default = option.default_value();
                        kind.validate(option.name, &default)?;

                        let key = self.insert_record(OptionRecord {
                            name: option.name.to_string(),
                            kind,
                            default: default.clone(),
                            tip: option.tip.to_string(),
                            program,
                            link: LinkKey::default(),
                            external: false,
                        });
                        inserted.push(key);

                        match registry.by_name.get(option.name) {
                            Some(&first) => self.link(first, key)?,
                            None => {
                                registry.by_name.insert(option.name.to_string(), key);
                            }
                        }
                        entries.push(OptionEntry::Record(key));
                    }
                }
            }
            registry.sets.push(OptionSet {
                name: set_decl.name.to_string(),
                entries,
            });
        }

        for rule_decl in decl.rules {
            let rule = rule_decl.to_rule();
            self.validate_rule(&registry, rule_decl.trigger, &rule)?;
            registry.rules.push(rule_decl.trigger, rule);
        }

        for name in decl.always_emit {
            if !registry.by_name.contains_key(*name) {
                return Err(Error::UnknownOption {
                    program,
                    name: name.to_string(),
                });
            }
            registry.always_emit.push(name.to_string());
        }
        Ok(registry)
    }

    fn validate_rule(&self, registry: &OptionRegistry, trigger: &str, rule: &Rule) -> OptionResult<()> {
        let invalid = |reason: String| Error::InvalidRule {
            program: registry.program,
            trigger: trigger.to_string(),
            target: rule.target.clone(),
            reason,
        };

        let trigger_key = registry
            .lookup(trigger)
            .ok_or_else(|| invalid("unknown trigger option".to_string()))?;
        let target_key = registry
            .lookup(&rule.target)
            .ok_or_else(|| invalid("unknown target option".to_string()))?;
        let trigger_kind = &self.records[trigger_key].kind;
        let target_kind = &self.records[target_key].kind;

        match &rule.condition {
            Condition::Equals(value) => trigger_kind
                .validate(trigger, value)
                .map_err(|err| invalid(err.to_string()))?,
            Condition::NonNegative | Condition::Positive if !trigger_kind.is_int() => {
                return Err(invalid("threshold condition on a non-integer option".to_string()));
            }
            _ => {}
        }

        match &rule.effect {
            Effect::Assign(value) => target_kind
                .validate(&rule.target, value)
                .map_err(|err| invalid(err.to_string()))?,
            Effect::Multiply(_) | Effect::Add(_) => {
                if !trigger_kind.is_int() || !target_kind.is_int() {
                    return Err(invalid(
                        "arithmetic effect between non-integer options".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn insert_record(&mut self, mut record: OptionRecord) -> RecordKey {
        let value = record.default.clone();
        let link = self.links.insert(LinkGroup {
            value,
            members: smallvec![],
        });
        record.link = link;
        let key = self.records.insert(record);
        self.links[link].members.push(key);
        key
    }

    fn remove_record(&mut self, key: RecordKey) {
        if let Some(record) = self.records.remove(key) {
            let empty = match self.links.get_mut(record.link) {
                Some(group) => {
                    group.members.retain(|member| *member != key);
                    group.members.is_empty()
                }
                None => false,
            };
            if empty {
                self.links.remove(record.link);
            }
        }
    }

    /// Link `b` to `a`: from now on both carry the same value, `a`'s current one.
    ///
    /// # Panics
    /// Panics if either key does not belong to this session.
    pub fn link(&mut self, a: RecordKey, b: RecordKey) -> OptionResult<()> {
        let (record_a, record_b) = (&self.records[a], &self.records[b]);
        if record_a.link == record_b.link {
            return Err(Error::AlreadyLinked {
                first: record_a.name.clone(),
                second: record_b.name.clone(),
            });
        }
        if !record_a.kind.same_shape(&record_b.kind) {
            return Err(Error::LinkKindMismatch {
                first: record_a.name.clone(),
                second: record_b.name.clone(),
            });
        }

        let (link_a, link_b) = (record_a.link, record_b.link);
        if let Some(merged) = self.links.remove(link_b) {
            for member in merged.members {
                self.records[member].link = link_a;
                self.links[link_a].members.push(member);
            }
        }
        trace!(
            "Linked option `{}` to `{}`.",
            self.records[b].name, self.records[a].name
        );
        Ok(())
    }

    /// Link the options named `names` of two registries.
    pub fn link_by_names(
        &mut self,
        program_a: ProgramKind,
        program_b: ProgramKind,
        names: &[&str],
    ) -> OptionResult<()> {
        for name in names {
            let a = self.require(program_a, name)?;
            let b = self.require(program_b, name)?;
            self.link(a, b)?;
        }
        Ok(())
    }

    /// Create a record outside of the option sets of `program` (eg., a
    /// widget on a run panel) that shares the value of option `name`.
    pub fn share_external(&mut self, program: ProgramKind, name: &str) -> OptionResult<RecordKey> {
        let source = self.require(program, name)?;
        let mut record = self.records[source].clone();
        record.external = true;

        let link = record.link;
        let key = self.records.insert(record);
        self.links[link].members.push(key);
        self.registries[program].externals.push(key);
        Ok(key)
    }

    pub fn registry(&self, program: ProgramKind) -> &OptionRegistry {
        &self.registries[program]
    }

    pub fn lookup(&self, program: ProgramKind, name: &str) -> Option<RecordKey> {
        self.registries[program].lookup(name)
    }

    fn require(&self, program: ProgramKind, name: &str) -> OptionResult<RecordKey> {
        self.lookup(program, name).ok_or_else(|| Error::UnknownOption {
            program,
            name: name.to_string(),
        })
    }

    pub fn get(&self, key: RecordKey) -> Option<&OptionRecord> {
        self.records.get(key)
    }

    /// # Panics
    /// Panics if `key` does not belong to this session.
    pub fn record(&self, key: RecordKey) -> &OptionRecord {
        &self.records[key]
    }

    /// Current value of a record.
    ///
    /// # Panics
    /// Panics if `key` does not belong to this session.
    pub fn value(&self, key: RecordKey) -> &OptionValue {
        &self.links[self.records[key].link].value
    }

    pub fn value_of(&self, program: ProgramKind, name: &str) -> Option<&OptionValue> {
        self.lookup(program, name).map(|key| self.value(key))
    }

    /// Records sharing the value of `key`, `key` included.
    pub fn linked(&self, key: RecordKey) -> &[RecordKey] {
        &self.links[self.records[key].link].members
    }

    pub fn is_nondefault(&self, key: RecordKey) -> bool {
        self.value(key) != &self.records[key].default
    }

    pub fn label_state(&self, key: RecordKey) -> LabelState {
        let record = &self.records[key];
        if self.is_nondefault(key) {
            LabelState::Nondefault
        } else if self.registries[record.program].rules.has_rules(&record.name) {
            LabelState::DefaultWithDependents
        } else {
            LabelState::Default
        }
    }

    /// Set the value of a record, then cascade to its linked records and its
    /// dependent options.
    ///
    /// Fails without changing anything if `value` is rejected by the kind of
    /// the record. Setting the current value again is a no-op and triggers no
    /// cascade. Cascaded updates rejected by their target are reported in
    /// [`ChangeReport::skipped`].
    pub fn apply_change(&mut self, key: RecordKey, value: OptionValue) -> OptionResult<ChangeReport> {
        let record = &self.records[key];
        record.kind.validate(&record.name, &value)?;

        let mut report = ChangeReport::default();
        self.propagate(key, value, &mut report);
        Ok(report)
    }

    pub fn apply_change_by_name(
        &mut self,
        program: ProgramKind,
        name: &str,
        value: OptionValue,
    ) -> OptionResult<ChangeReport> {
        let key = self.require(program, name)?;
        self.apply_change(key, value)
    }

    /// Like [`Self::apply_change`], but without evaluating dependency rules.
    pub fn apply_shared(&mut self, key: RecordKey, value: OptionValue) -> OptionResult<ChangeReport> {
        let record = &self.records[key];
        record.kind.validate(&record.name, &value)?;

        let mut report = ChangeReport::default();
        self.store(key, value, &mut report);
        Ok(report)
    }

    fn store(&mut self, key: RecordKey, value: OptionValue, report: &mut ChangeReport) -> bool {
        let group = &mut self.links[self.records[key].link];
        if group.value == value {
            return false;
        }
        group.value = value;
        for member in group.members.clone() {
            report.mark(member);
        }
        true
    }

    fn propagate(&mut self, key: RecordKey, value: OptionValue, report: &mut ChangeReport) {
        if !self.store(key, value, report) {
            trace!("Option `{}` unchanged, no cascade.", self.records[key].name);
            return;
        }

        let record = &self.records[key];
        let (program, name) = (record.program, record.name.clone());
        let value = self.value(key).clone();
        let rules = self.registries[program].rules.rules_for(&name).to_vec();

        for rule in rules {
            if !rule.condition.holds(&value) {
                continue;
            }

            let computed = self.require(program, &rule.target).and_then(|target| {
                let value = rule.effect.apply(&rule.target, &value)?;
                self.records[target].kind.validate(&rule.target, &value)?;
                Ok((target, value))
            });

            match computed {
                Ok((target, new_value)) => {
                    debug!(
                        "Option `{}` = {} ({}) updates `{}` to {}.",
                        name, value, rule.condition, rule.target, new_value
                    );
                    self.propagate(target, new_value, report);
                }
                Err(error) => {
                    warn!(
                        "Option `{}` = {} cannot update `{}`: {}",
                        name, value, rule.target, error
                    );
                    report.skipped.push(SkippedUpdate {
                        trigger: name.clone(),
                        target: rule.target.clone(),
                        error,
                    });
                }
            }
        }
    }

    fn scope_records(&self, scope: ResetScope) -> Vec<RecordKey> {
        match scope {
            ResetScope::Session => self
                .registries
                .values()
                .flat_map(|registry| registry.records())
                .collect(),
            ResetScope::Registry(program) => self.registries[program].records().collect(),
            ResetScope::Set(program, index) => self.registries[program]
                .sets
                .get(index)
                .map(|set| set.records().collect())
                .unwrap_or_default(),
            ResetScope::Record(key) => vec![key],
        }
    }

    /// Restore the default value of every record in `scope`, cascading like
    /// [`Self::apply_change`].
    ///
    /// Passes are repeated until nothing changes, so that a record restored
    /// early and modified again by a later cascade ends up restored too.
    pub fn reset_to_default(&mut self, scope: ResetScope) -> ChangeReport {
        let keys = self.scope_records(scope);
        let mut report = ChangeReport::default();

        for _ in 0..=keys.len() {
            let mut pass = ChangeReport::default();
            for &key in &keys {
                let default = self.records[key].default.clone();
                if self.value(key) != &default {
                    self.propagate(key, default, &mut pass);
                }
            }

            let done = pass.changed.is_empty();
            report.merge(pass);
            if done {
                break;
            }
        }
        report
    }

    /// Options of `program` to write into its input: every logical option with
    /// a nondefault value (once), then the options that are always written.
    pub fn nondefaults(&self, program: ProgramKind) -> Vec<Directive> {
        let registry = &self.registries[program];
        let mut seen = HashSet::new();
        let mut directives = Vec::new();

        for set in registry.emit_order() {
            for key in set.records() {
                let name = &self.records[key].name;
                if self.is_nondefault(key) && seen.insert(name.as_str()) {
                    directives.push(Directive::new(name.clone(), self.value(key).clone()));
                }
            }
        }

        for name in &registry.always_emit {
            if seen.contains(name.as_str()) {
                continue;
            }
            if let Some(key) = registry.lookup(name) {
                directives.push(Directive::new(name.clone(), self.value(key).clone()));
            }
        }
        directives
    }

    /// Kind of option `name` of `program`, if it exists.
    pub fn kind_of(&self, program: ProgramKind, name: &str) -> Option<&OptionKind> {
        self.lookup(program, name).map(|key| &self.records[key].kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        registry::{Column, SetDecl, flag, group, int},
        rules::{Lit, RuleDecl, Then, When},
    };

    const SETS: &[SetDecl] = &[
        SetDecl {
            name: "Basic",
            entries: &[
                group("Limits", Column::Left),
                int("max_seconds", 60, -1, 1000, "Time limit."),
                flag("tidy", false, "Tidy up."),
            ],
        },
        SetDecl {
            name: "Limits",
            entries: &[
                int("max_seconds", 60, -1, 1000, "Time limit."),
                int("max_minutes", -1, -1, 100, "Time limit in minutes."),
            ],
        },
    ];

    const RULES: &[RuleDecl] = &[RuleDecl::new(
        "max_minutes",
        When::NonNegative,
        "max_seconds",
        Then::Multiply(60),
    )];

    const DECL: RegistryDecl = RegistryDecl {
        program: ProgramKind::Prover9,
        sets: SETS,
        rules: RULES,
        always_emit: &["max_seconds"],
        basic_set_last: true,
    };

    fn session() -> OptionSession {
        let mut session = OptionSession::new();
        session.install(&DECL).unwrap();
        session
    }

    #[test]
    fn test_same_name_is_linked_across_sets() {
        let session = session();
        let registry = session.registry(ProgramKind::Prover9);
        let in_basic: Vec<_> = registry.sets()[0].records().collect();
        let in_limits: Vec<_> = registry.sets()[1].records().collect();

        assert_eq!(session.linked(in_basic[0]).len(), 2);
        assert!(session.linked(in_basic[0]).contains(&in_limits[0]));
        assert_eq!(session.linked(in_basic[1]).len(), 1);
    }

    #[test]
    fn test_cascade_exceeding_target_range_is_skipped() {
        let mut session = session();
        let minutes = session.lookup(ProgramKind::Prover9, "max_minutes").unwrap();

        let report = session.apply_change(minutes, OptionValue::Int(100)).unwrap();
        assert_eq!(session.value(minutes), &OptionValue::Int(100));
        assert_eq!(
            session.value_of(ProgramKind::Prover9, "max_seconds"),
            Some(&OptionValue::Int(60))
        );
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].error.is_out_of_range());
    }

    #[test]
    fn test_label_state() {
        let mut session = session();
        let minutes = session.lookup(ProgramKind::Prover9, "max_minutes").unwrap();
        let tidy = session.lookup(ProgramKind::Prover9, "tidy").unwrap();

        assert_eq!(session.label_state(minutes), LabelState::DefaultWithDependents);
        assert_eq!(session.label_state(tidy), LabelState::Default);

        session.apply_change(tidy, true.into()).unwrap();
        assert_eq!(session.label_state(tidy), LabelState::Nondefault);
    }

    #[test]
    fn test_install_rejects_invalid_rule() {
        const BAD_RULES: &[RuleDecl] = &[RuleDecl::new(
            "tidy",
            When::Is(Lit::Flag(true)),
            "max_seconds",
            Then::Set(Lit::Flag(true)),
        )];
        let mut session = OptionSession::new();
        let err = session
            .install(&RegistryDecl {
                rules: BAD_RULES,
                ..DECL
            })
            .unwrap_err();
        assert!(err.is_invalid_rule());
        assert!(session.records.is_empty());
        assert!(session.registry(ProgramKind::Prover9).sets().is_empty());
    }

    #[test]
    fn test_reinstall_replaces_records() {
        let mut session = session();
        let before = session.lookup(ProgramKind::Prover9, "tidy").unwrap();
        session.install(&DECL).unwrap();

        assert!(session.get(before).is_none());
        assert_eq!(session.records.len(), 4);
    }

    #[test]
    fn test_nondefaults_always_emit() {
        let mut session = session();
        let tidy = session.lookup(ProgramKind::Prover9, "tidy").unwrap();
        session.apply_change(tidy, true.into()).unwrap();

        let rendered: Vec<_> = session
            .nondefaults(ProgramKind::Prover9)
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(rendered, ["set(tidy).", "assign(max_seconds, 60)."]);
    }
}
