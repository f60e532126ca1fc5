//! Built-in option catalogs
//!
//! Static declarations of the option sets and dependency rules of both
//! programs. They are instantiated by [`crate::session::OptionSession::install`].
use crate::{
    registry::RegistryDecl,
    rules::{Lit, RuleDecl, Then, When},
};

pub mod mace4;
pub mod prover9;

/// Option sets and rules of the theorem prover.
pub fn prover9() -> &'static RegistryDecl {
    &prover9::REGISTRY
}

/// Option set and rules of the model finder.
pub fn mace4() -> &'static RegistryDecl {
    &mace4::REGISTRY
}

/// `trigger` set to `value` gives `target` the value of `then`.
pub(crate) const fn on(trigger: &'static str, value: bool, target: &'static str, then: Then) -> RuleDecl {
    RuleDecl::new(trigger, When::Is(Lit::Flag(value)), target, then)
}

/// `trigger` set to a value `>= 0` gives `target` the value of `then`.
pub(crate) const fn on_non_negative(trigger: &'static str, target: &'static str, then: Then) -> RuleDecl {
    RuleDecl::new(trigger, When::NonNegative, target, then)
}

/// Any change of `trigger` gives `target` the value of `then`.
pub(crate) const fn on_any(trigger: &'static str, target: &'static str, then: Then) -> RuleDecl {
    RuleDecl::new(trigger, When::Any, target, then)
}

pub(crate) const fn to_flag(value: bool) -> Then {
    Then::Set(Lit::Flag(value))
}

pub(crate) const fn to_int(value: i64) -> Then {
    Then::Set(Lit::Int(value))
}

pub(crate) const fn to_choice(value: &'static str) -> Then {
    Then::Set(Lit::Choice(value))
}

#[cfg(test)]
mod tests {
    use crate::{ProgramKind, session::OptionSession};

    #[test]
    fn test_catalogs_install() {
        let session = OptionSession::standard().unwrap();

        let prover = session.registry(ProgramKind::Prover9);
        assert_eq!(prover.sets().len(), 14);
        assert_eq!(prover.set_names().next(), Some("Basic Options"));
        assert_eq!(prover.rules().len(), 89);

        let finder = session.registry(ProgramKind::Mace4);
        assert_eq!(finder.set_names().collect::<Vec<_>>(), ["Mace4 Options"]);
        assert_eq!(finder.rules().len(), 2);
    }

    #[test]
    fn test_defaults_emit_only_max_seconds() {
        let session = OptionSession::standard().unwrap();
        for program in [ProgramKind::Prover9, ProgramKind::Mace4] {
            let rendered: Vec<_> = session
                .nondefaults(program)
                .iter()
                .map(|d| d.to_string())
                .collect();
            assert_eq!(rendered, ["assign(max_seconds, 60)."]);
        }
    }
}
