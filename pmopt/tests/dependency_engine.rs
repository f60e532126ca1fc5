use pmopt::{
    ProgramKind,
    record::LabelState,
    session::{OptionSession, ResetScope},
    value::{INT_INF, OptionValue},
};

const P9: ProgramKind = ProgramKind::Prover9;
const M4: ProgramKind = ProgramKind::Mace4;

fn session() -> OptionSession {
    OptionSession::standard().expect("built-in catalogs are valid")
}

fn int(session: &OptionSession, program: ProgramKind, name: &str) -> i64 {
    session
        .value_of(program, name)
        .and_then(OptionValue::as_int)
        .unwrap_or_else(|| panic!("{name} is not an integer option"))
}

fn flag(session: &OptionSession, program: ProgramKind, name: &str) -> bool {
    match session.value_of(program, name) {
        Some(OptionValue::Flag(value)) => *value,
        other => panic!("{name} is not a flag option: {other:?}"),
    }
}

fn rendered(session: &OptionSession, program: ProgramKind) -> Vec<String> {
    session
        .nondefaults(program)
        .iter()
        .map(|directive| directive.to_string())
        .collect()
}

#[test]
fn breadth_first_overrides_lightest_first() {
    let mut session = session();
    session
        .apply_change_by_name(P9, "lightest_first", true.into())
        .unwrap();
    assert_eq!(int(&session, P9, "weight_part"), 1);
    assert_eq!(int(&session, P9, "age_part"), 0);

    session
        .apply_change_by_name(P9, "breadth_first", true.into())
        .unwrap();

    assert_eq!(int(&session, P9, "age_part"), 1);
    for name in ["weight_part", "false_part", "true_part", "random_part"] {
        assert_eq!(int(&session, P9, name), 0, "{name} should be cleared");
    }
    assert!(flag(&session, P9, "breadth_first"));
    assert!(!flag(&session, P9, "lightest_first"));
    assert!(!flag(&session, P9, "random_given"));
    assert_eq!(int(&session, P9, "pick_given_ratio"), -1);
}

#[test]
fn time_limits_are_converted_to_seconds() {
    let mut session = session();
    let max_hours = session.lookup(P9, "max_hours").unwrap();
    let report = session.apply_change(max_hours, OptionValue::Int(2)).unwrap();

    assert_eq!(int(&session, P9, "max_seconds"), 7200);
    assert!(report.skipped.is_empty());

    // Every panel showing max_seconds is refreshed.
    let max_seconds = session.lookup(P9, "max_seconds").unwrap();
    for key in session.linked(max_seconds) {
        assert!(report.contains(*key));
        assert_eq!(session.value(*key), &OptionValue::Int(7200));
    }

    session
        .apply_change_by_name(P9, "max_minutes", OptionValue::Int(5))
        .unwrap();
    assert_eq!(int(&session, P9, "max_seconds"), 300);
    assert_eq!(int(&session, P9, "max_hours"), -1);
    assert_eq!(int(&session, P9, "max_days"), -1);
}

#[test]
fn linked_records_stay_in_sync() {
    let mut session = session();
    let in_prover = session.lookup(P9, "prolog_style_variables").unwrap();
    let in_finder = session.lookup(M4, "prolog_style_variables").unwrap();

    // Basic Options, Input/Output and the model finder panel.
    assert_eq!(session.linked(in_prover).len(), 3);

    let report = session.apply_change(in_finder, true.into()).unwrap();
    assert_eq!(report.changed.len(), 3);
    for key in session.linked(in_prover) {
        assert_eq!(session.value(*key), &OptionValue::Flag(true));
        assert_eq!(session.label_state(*key), LabelState::Nondefault);
    }
}

#[test]
fn unchanged_value_is_a_noop() {
    let mut session = session();
    let auto = session.lookup(P9, "auto").unwrap();
    let report = session.apply_change(auto, true.into()).unwrap();
    assert!(report.is_empty());
}

#[test]
fn rejected_value_leaves_session_untouched() {
    let mut session = session();

    let err = session
        .apply_change_by_name(P9, "max_seconds", OptionValue::Int(-2))
        .unwrap_err();
    assert!(err.is_out_of_range());
    assert_eq!(int(&session, P9, "max_seconds"), 60);

    let err = session
        .apply_change_by_name(P9, "order", "xyz".into())
        .unwrap_err();
    assert!(err.is_not_in_choices());
    assert_eq!(session.value_of(P9, "order"), Some(&"lpo".into()));

    let err = session
        .apply_change_by_name(P9, "auto", OptionValue::Int(1))
        .unwrap_err();
    assert!(err.is_kind_mismatch());

    let err = session
        .apply_change_by_name(M4, "no_such_option", true.into())
        .unwrap_err();
    assert!(err.is_unknown_option());

    assert_eq!(rendered(&session, P9), ["assign(max_seconds, 60)."]);
}

#[test]
fn domain_size_sets_both_bounds() {
    let mut session = session();
    session
        .apply_change_by_name(M4, "domain_size", OptionValue::Int(5))
        .unwrap();
    assert_eq!(int(&session, M4, "start_size"), 5);
    assert_eq!(int(&session, M4, "end_size"), 5);

    // start_size cannot go below 2, the update is skipped and reported.
    let report = session
        .apply_change_by_name(M4, "domain_size", OptionValue::Int(0))
        .unwrap();
    assert_eq!(int(&session, M4, "start_size"), 5);
    assert_eq!(int(&session, M4, "end_size"), 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].target, "start_size");
    assert!(report.skipped[0].error.is_range_error());
}

#[test]
fn meta_flags_cascade_transitively() {
    let mut session = session();
    session.apply_change_by_name(P9, "raw", true.into()).unwrap();

    assert!(!flag(&session, P9, "auto"));
    assert!(!flag(&session, P9, "auto_limits"));
    assert!(!flag(&session, P9, "predicate_elim"));
    assert_eq!(session.value_of(P9, "eq_defs"), Some(&"pass".into()));
    assert_eq!(session.value_of(P9, "literal_selection"), Some(&"none".into()));
    assert_eq!(int(&session, P9, "max_weight"), INT_INF);
    assert_eq!(int(&session, P9, "sos_limit"), -1);
    assert_eq!(int(&session, P9, "backsub_check"), INT_INF);
    assert!(flag(&session, P9, "lightest_first"));
    assert_eq!(int(&session, P9, "weight_part"), 1);
}

#[test]
fn reset_is_idempotent() {
    let mut session = session();
    session.apply_change_by_name(P9, "auto2", true.into()).unwrap();
    session.apply_change_by_name(P9, "max_days", OptionValue::Int(1)).unwrap();
    session.apply_change_by_name(M4, "domain_size", OptionValue::Int(7)).unwrap();
    assert!(rendered(&session, P9).len() > 10);

    let first = session.reset_to_default(ResetScope::Session);
    assert!(!first.changed.is_empty());
    assert_eq!(rendered(&session, P9), ["assign(max_seconds, 60)."]);
    assert_eq!(rendered(&session, M4), ["assign(max_seconds, 60)."]);

    let second = session.reset_to_default(ResetScope::Session);
    assert!(second.is_empty());
}

#[test]
fn reset_of_one_set() {
    let mut session = session();
    session.apply_change_by_name(P9, "random_given", true.into()).unwrap();
    session.apply_change_by_name(P9, "print_gen", true.into()).unwrap();

    let index = session.registry(P9).set_index("Select Given").unwrap();
    session.reset_to_default(ResetScope::Set(P9, index));

    assert!(!flag(&session, P9, "random_given"));
    assert_eq!(int(&session, P9, "random_part"), 0);
    assert_eq!(int(&session, P9, "false_part"), 4);
    assert!(flag(&session, P9, "print_gen"));
}

#[test]
fn nondefaults_are_collected_once_basic_set_last() {
    let mut session = session();
    session.apply_change_by_name(P9, "max_weight", OptionValue::Int(50)).unwrap();
    session.apply_change_by_name(P9, "auto_denials", false.into()).unwrap();

    assert_eq!(
        rendered(&session, P9),
        [
            "clear(auto_denials).",
            "assign(max_weight, 50).",
            "assign(max_seconds, 60).",
        ]
    );
}

#[test]
fn external_record_shares_value() {
    let mut session = session();
    let external = session.share_external(M4, "max_seconds").unwrap();
    assert!(session.record(external).is_external());

    session.apply_change(external, OptionValue::Int(30)).unwrap();
    assert_eq!(int(&session, M4, "max_seconds"), 30);
    assert_eq!(int(&session, P9, "max_seconds"), 60);
    assert_eq!(rendered(&session, M4), ["assign(max_seconds, 30)."]);

    session.reset_to_default(ResetScope::Registry(M4));
    assert_eq!(session.value(external), &OptionValue::Int(60));
}

#[test]
fn link_errors() {
    let mut session = session();

    let err = session
        .link_by_names(P9, M4, &["prolog_style_variables"])
        .unwrap_err();
    assert!(err.is_already_linked());

    let err = session.link_by_names(P9, M4, &["order"]).unwrap_err();
    assert!(err.is_unknown_option());

    let megs = session.lookup(P9, "max_megs").unwrap();
    let print_models = session.lookup(M4, "print_models").unwrap();
    assert!(session.link(megs, print_models).unwrap_err().is_link_kind_mismatch());
}

#[test]
fn label_states() {
    let mut session = session();
    let auto = session.lookup(P9, "auto").unwrap();
    let factor = session.lookup(P9, "factor").unwrap();

    assert_eq!(session.label_state(auto), LabelState::DefaultWithDependents);
    assert_eq!(session.label_state(factor), LabelState::Default);

    session.apply_change(auto, false.into()).unwrap();
    assert_eq!(session.label_state(auto), LabelState::Nondefault);
    let auto_limits = session.lookup(P9, "auto_limits").unwrap();
    assert_eq!(session.label_state(auto_limits), LabelState::Nondefault);
}
