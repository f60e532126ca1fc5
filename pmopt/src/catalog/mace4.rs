use super::on_any;
use crate::{
    ProgramKind,
    registry::{Column, RegistryDecl, SetDecl, choice, flag, group, int},
    rules::{RuleDecl, Then},
    value::INT_INF,
};

const OPTIONS: SetDecl = SetDecl {
    name: "Mace4 Options",
    entries: &[
        group("Basic Options", Column::Left),
        int("domain_size", 0, 0, INT_INF, "Look for structures of this size only."),
        int("start_size", 2, 2, INT_INF, "Initial (smallest) domain size."),
        int("end_size", -1, -1, INT_INF, "Final (largest) domain size (-1 means infinity)."),
        int("increment", 1, 1, INT_INF, "Increment for next domain size (when end_size > start_size)."),
        choice(
            "iterate",
            "all",
            &["all", "evens", "odds", "primes", "nonprimes"],
            "Domain sizes must satisfy this property.",
        ),
        int("max_models", 1, -1, INT_INF, "Stop search at this number of models (-1 means no limit)."),
        int("max_seconds", 60, -1, INT_INF, "Overall time limit."),
        int("max_seconds_per", -1, -1, INT_INF, "Time limit for each domain size."),
        flag(
            "prolog_style_variables",
            false,
            "Variables start with upper case instead of starting with u,v,w,x,y,z.",
        ),
        group("Other Options", Column::Left),
        flag("integer_ring", false, "Impose a ring structure (see sample input Ring-19.in)."),
        flag("skolems_last", false, "Decide Skolem symbols last."),
        int("max_megs", 200, -1, INT_INF, "Memory limit for Mace4 process (approximate)."),
        flag("print_models", true, "Output models that are found."),
        group("Experimental Options", Column::Right),
        flag("lnh", true, "Least Number Optimization."),
        flag("negprop", true, "Apply negative propagation."),
        flag("neg_assign", true, "Negative propagation is triggered by assignments."),
        flag("neg_assign_near", true, "Negative propagation is triggered by near-assignments."),
        flag("neg_elim", true, "Negative propagation is triggered by eliminations."),
        flag("neg_elim_near", true, "Negative propagation is triggered by near-eliminations."),
        int("selection_order", 2, 0, 2, "0: all, 1: concentric, 2: concentric-band."),
        int(
            "selection_measure",
            4,
            0,
            4,
            "0: first, 1: most occurrences, 2: most propagations, 3: most contradictions, 4: fewest values.",
        ),
    ],
};

// A fixed domain size is searched as the range [domain_size, domain_size].
const RULES: &[RuleDecl] = &[
    on_any("domain_size", "start_size", Then::Multiply(1)),
    on_any("domain_size", "end_size", Then::Multiply(1)),
];

pub const REGISTRY: RegistryDecl = RegistryDecl {
    program: ProgramKind::Mace4,
    sets: &[OPTIONS],
    rules: RULES,
    // The front-end default differs from the program default.
    always_emit: &["max_seconds"],
    basic_set_last: false,
};
