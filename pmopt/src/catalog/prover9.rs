use super::{on, on_non_negative, to_choice, to_flag, to_int};
use crate::{
    ProgramKind,
    registry::{Column, EntryDecl, RegistryDecl, SetDecl, choice, flag, group, int},
    rules::{RuleDecl, Then},
    value::INT_INF,
};

const MAX_WEIGHT: EntryDecl = int(
    "max_weight",
    100,
    -INT_INF,
    INT_INF,
    "Discard inferred clauses with weight greater than this.",
);
const PICK_GIVEN_RATIO: EntryDecl = int(
    "pick_given_ratio",
    -1,
    -1,
    INT_INF,
    "Selection by (Weight : Age) ratio  (except for hints).",
);
const ORDER: EntryDecl = choice(
    "order",
    "lpo",
    &["lpo", "rpo", "kbo"],
    "Overall term ordering: Lexicographic Path Ordering (LPO), Recursive Path Ordering (RPO), \
     Knuth-Bendix Ordering (KBO).  If the search fails with LPO, try KBO.",
);
const EQ_DEFS: EntryDecl = choice(
    "eq_defs",
    "unfold",
    &["unfold", "fold", "pass"],
    "Adjustment of term ordering, based on equational definitions in the input.\n\
     Unfold: eliminate defined operations at the start of the search;\n\
     Fold: introduce the defined operation whenever possible;\n\
     Pass: let equational definitions be oriented by the term ordering.",
);
const EXPAND_RELATIONAL_DEFS: EntryDecl = flag(
    "expand_relational_defs",
    false,
    "Use relational definitions in the input to immediately expand occurrences of the defined \
     relations in the input.",
);
const MAX_SECONDS: EntryDecl = int(
    "max_seconds",
    60,
    -1,
    INT_INF,
    "Stop the search at this number of seconds (CPU, not wall clock).",
);
const PROLOG_STYLE_VARIABLES: EntryDecl = flag(
    "prolog_style_variables",
    false,
    "Variables start with upper case instead of starting with u,v,w,x,y,z.",
);

const BASIC: SetDecl = SetDecl {
    name: "Basic Options",
    entries: &[
        MAX_WEIGHT,
        PICK_GIVEN_RATIO,
        ORDER,
        EQ_DEFS,
        EXPAND_RELATIONAL_DEFS,
        flag(
            "restrict_denials",
            false,
            "This flag restricts the application of inference rules when negative clauses are \
             involved, with the goal of producing more direct (forward) proofs.  WARNING: this \
             flag can block proofs.",
        ),
        MAX_SECONDS,
        PROLOG_STYLE_VARIABLES,
    ],
};

const META: SetDecl = SetDecl {
    name: "Meta Options",
    entries: &[
        flag("auto", true, "Automatic Mode.  This flag simply sets or clears the following 4 flags."),
        flag("auto_setup", true, "Processing before the search starts."),
        flag("auto_limits", true, "Search limits."),
        flag("auto_denials", true, "Automatic handling of denials (negative clauses in Horn sets)."),
        flag("auto_inference", true, "Automatic selection of inference rules, based on the input."),
        flag("auto_process", true, "Processing of inferred clauses."),
        flag("auto2", false, "Experimental automatic mode."),
        flag("raw", false, "Raw (anti-automatic) mode."),
    ],
};

const TERM_ORDERING: SetDecl = SetDecl {
    name: "Term Ordering",
    entries: &[
        ORDER,
        EQ_DEFS,
        flag(
            "inverse_order",
            true,
            "Adjustment of term ordering, based on occurrences of inverse axioms in the input.",
        ),
    ],
};

const LIMITS: SetDecl = SetDecl {
    name: "Limits",
    entries: &[
        group("Search Limits", Column::Left),
        int("max_given", -1, -1, INT_INF, "Stop the search at this number of given clauses."),
        int("max_kept", -1, -1, INT_INF, "Stop the search at this number of kept clauses."),
        int("max_proofs", 1, -1, INT_INF, "Stop the search at this number of proofs."),
        int(
            "max_megs",
            200,
            -1,
            INT_INF,
            "Stop the search when the process has used about this amount of memory.",
        ),
        MAX_SECONDS,
        int("max_minutes", -1, -1, INT_INF, ""),
        int("max_hours", -1, -1, INT_INF, ""),
        int("max_days", -1, -1, INT_INF, ""),
        group("Limits on Kept Clauses", Column::Right),
        MAX_WEIGHT,
        int("max_depth", -1, -1, INT_INF, "Discard inferred clauses with depth greater than this."),
        int("max_literals", -1, -1, INT_INF, "Discard inferred clauses with more literals than this."),
        int("max_vars", -1, -1, INT_INF, "Discard inferred clauses with more variables than this."),
        group("Sos Control", Column::Right),
        int(
            "sos_limit",
            20000,
            -1,
            INT_INF,
            "Limit on the size of the SOS list (the list of clauses that have been kept, but not \
             yet selected as given clauses).  As the SOS fills up, a heuristic is used to discards \
             new clauses that are unlikely to be used due to this limit.",
        ),
    ],
};

const SEARCH_PREP: SetDecl = SetDecl {
    name: "Search Prep",
    entries: &[
        EXPAND_RELATIONAL_DEFS,
        flag(
            "dont_flip_input",
            false,
            "Do not flip input equalities, even if they violate the term ordering.  Using this \
             flag can cause nontermination of rewriting.  It is usually better to adjust the term \
             ordering instead.",
        ),
        flag(
            "process_initial_sos",
            true,
            "Treat input clauses as if they were inferred; exceptions are the application of \
             max_weight, max_level, max_vars, and max_literals.",
        ),
        flag(
            "sort_initial_sos",
            false,
            "Sort the initial assumptions.  The order is largely  arbitrary.",
        ),
        flag(
            "predicate_elim",
            true,
            "Try to eliminate predicate (relation) symbols before the search starts.",
        ),
        int("fold_denial_max", 0, -1, INT_INF, ""),
    ],
};

const GOALS: SetDecl = SetDecl {
    name: "Goals/Denials",
    entries: &[
        flag(
            "restrict_denials",
            false,
            "This flag applies only to Horn sets.  It restricts the application of inference \
             rules when negative clauses are involved, with the goal of producing more direct \
             (forward) proofs.",
        ),
        flag(
            "reuse_denials",
            false,
            "This flag allows multiple proofs of goals.  (Applies to Horn sets only.",
        ),
    ],
};

const SELECT_GIVEN: SetDecl = SetDecl {
    name: "Select Given",
    entries: &[
        group("Selection Ratio", Column::Left),
        int("hints_part", INT_INF, 0, INT_INF, "Component for clauses that match hint."),
        int("age_part", 1, 0, INT_INF, "Component for the oldest clauses."),
        int("weight_part", 0, 0, INT_INF, "Component for the lightest clauses."),
        int(
            "false_part",
            4,
            0,
            INT_INF,
            "Component for the lightest false (w.r.t. an interpretation) clauses.",
        ),
        int(
            "true_part",
            4,
            0,
            INT_INF,
            "Component for the lightest true (w.r.t. an interpretation) clauses.",
        ),
        int("random_part", 0, 0, INT_INF, "Component for random clauses."),
        group("Meta Options", Column::Right),
        PICK_GIVEN_RATIO,
        flag("breadth_first", false, "Selection by age only (except for hints)."),
        flag("lightest_first", false, "Selection by weight only (except for hints)."),
        flag("random_given", false, "Random selection (except for hints)."),
        group("Semantic Guidance", Column::Left),
        choice(
            "multiple_interps",
            "false_in_all",
            &["false_in_all", "false_in_some"],
            "Semantics with multiple interpretaions: determines how clauses are marked as \"false\".",
        ),
        int(
            "eval_limit",
            1024,
            -1,
            INT_INF,
            "Limit on the number of ground instances for evaluation in an explicit interpretation \
             (for semantic guidance).",
        ),
        group("Others", Column::Right),
        flag(
            "input_sos_first",
            true,
            "Before starting with selection ratio, select input clauses.",
        ),
        flag(
            "breadth_first_hints",
            false,
            "For hints component, select by age rather than by weight.",
        ),
    ],
};

const INFERENCE_RULES: SetDecl = SetDecl {
    name: "Inference Rules",
    entries: &[
        group("Ordinary Rules", Column::Left),
        flag("binary_resolution", false, "Binary resolution (not necessarily positive)."),
        flag("neg_binary_resolution", false, "Negative binary resolution."),
        flag("hyper_resolution", false, "Synonym for pos_hyperresolution."),
        flag("pos_hyper_resolution", false, "Positive hyperresolution."),
        flag("neg_hyper_resolution", false, "Negative hyperresolution."),
        flag("ur_resolution", false, "Unit resulting resolution."),
        flag("pos_ur_resolution", false, "Positive-unit resulting resolution."),
        flag("neg_ur_resolution", false, "Negative-unit resulting resolution."),
        flag("paramodulation", false, "The inference rule for equality."),
        group("Other Rules", Column::Left),
        int(
            "new_constants",
            0,
            -1,
            INT_INF,
            "If > 0, introduce new constants when equations such as x*x'=y*y' are derived.  The \
             value of this parameter is a limit on the number of times the rule will be applied.",
        ),
        flag("factor", false, ""),
        group("General Restrictions", Column::Right),
        choice(
            "literal_selection",
            "max_negative",
            &["max_negative", "all_negative", "none"],
            "Method for determining which literals in a multi-literal clause are eligible for \
             resolution or paramodulation.",
        ),
        group("Resolution Restrictions", Column::Right),
        flag(
            "ordered_res",
            true,
            "Resolved literals in one or more parents must be maximal in the clause.  (Does not \
             apply to UR resolution.)",
        ),
        flag(
            "check_res_instances",
            false,
            "The maximality checks are done after the application of the unifier for the inference.",
        ),
        flag(
            "initial_nuclei",
            false,
            "For hyperresolution and UR resolution the nucleus for the inference must be an \
             initial clause (this restriction can block all proofs).",
        ),
        int(
            "ur_nucleus_limit",
            -1,
            -1,
            INT_INF,
            "The nucleus for each UR-resolution inference can have at most this many  literals.",
        ),
        group("Paramodulation Restrictions", Column::Right),
        flag(
            "ordered_para",
            true,
            "For paramodulation inferences, one or both parents must be maximal in the clause.",
        ),
        flag(
            "check_para_instances",
            false,
            "The maximality checks are done after the application of the unifier for the inference.",
        ),
        flag(
            "para_from_vars",
            true,
            "Paramodulation is allowed from variables (not allowing can block all proofs)..",
        ),
        flag(
            "para_units_only",
            false,
            "Paramodulation is applied to unit clauses only (this restriction can block all proofs).",
        ),
        int(
            "para_lit_limit",
            -1,
            -1,
            INT_INF,
            "Paramodulation is not applied to clauses with more than this number of literals \
             (using this restriction can block all proofs).",
        ),
    ],
};

const REWRITING: SetDecl = SetDecl {
    name: "Rewriting",
    entries: &[
        group("Term Rewriting Limits", Column::Left),
        int(
            "demod_step_limit",
            1000,
            -1,
            INT_INF,
            "When rewriting derived clauses, apply at most this many rewrite steps.  Under most \
             settings, rewriting is guaranteed to terminate, but it can be intractable.",
        ),
        int(
            "demod_size_limit",
            1000,
            -1,
            INT_INF,
            "When rewriting derived clauses, stop if the term being rewritten has more than this \
             many symbols.",
        ),
        group("Lex-Dependent Rewriting", Column::Right),
        flag(
            "lex_dep_demod",
            true,
            "Apply non-orientable equations as rewrite rules if the instance used for the rewrite \
             is orientable.",
        ),
        flag(
            "lex_dep_demod_sane",
            true,
            "This is a restriction on lex_dep_demod.  A non-orientable equation can be used for \
             rewriting only if the two sides have the same number of symbols.",
        ),
        int(
            "lex_dep_demod_lim",
            11,
            -1,
            INT_INF,
            "This is a restriction on lex_dep_demod.  A non-orientable equation can be used for \
             rewriting only if it has fewer than this number of symbols.",
        ),
        flag(
            "lex_order_vars",
            false,
            "Incorporate (uninstantiated) variables into the term ordering, treating them as \
             constants.  For example, x*y < y*x.  This cuts down the search, but it can block all \
             proofs.",
        ),
        group("Others", Column::Left),
        flag("back_demod", true, "Use newly derived equations to rewrite old clauses."),
        flag(
            "unit_deletion",
            false,
            "Remove literals from newly derived clauses with old unit clauses, and use newly \
             derived unit clauses to remove literals from old clauses.",
        ),
        flag(
            "cac_redundancy",
            true,
            "Eliminate some redundancy when there are commutative or associative-commutative \
             operations.",
        ),
    ],
};

const WEIGHTING: SetDecl = SetDecl {
    name: "Weighting",
    entries: &[
        group("Symbol Weights", Column::Left),
        int("variable_weight", 1, -INT_INF, INT_INF, "Weight of variables ."),
        int("constant_weight", 1, -INT_INF, INT_INF, "Default weight of constants."),
        int("not_weight", 0, -INT_INF, INT_INF, "Weight of the negation symbol."),
        int("or_weight", 0, -INT_INF, INT_INF, "Weight of the disjunction symbol."),
        int(
            "sk_constant_weight",
            1,
            -INT_INF,
            INT_INF,
            "Weight of Skolem constants.  This option can be useful, because Skolem constants \
             cannot appear in weighting rules.",
        ),
        int("prop_atom_weight", 1, -INT_INF, INT_INF, "Weight of propositional atoms."),
        group("Penalties", Column::Right),
        int(
            "skolem_penalty",
            1,
            0,
            INT_INF,
            "If a term contains a (non-constant) Skolem function, its weight is multiplied by \
             this value.",
        ),
        int(
            "nest_penalty",
            0,
            0,
            INT_INF,
            "For each nest of two identical function symbols, e.g., f(f(x,y),z), this value is \
             added tot he weight of the term.",
        ),
        int(
            "depth_penalty",
            0,
            -INT_INF,
            INT_INF,
            "After the weight of clause C is calculated, its weight is increased by depth(C) * \
             this_value.",
        ),
        int(
            "var_penalty",
            0,
            -INT_INF,
            INT_INF,
            "After the weight of clause C is calculated, its weight is increased by \
             number_of_vars(C) * this_value.",
        ),
        group("Others", Column::Right),
        int("default_weight", INT_INF, -INT_INF, INT_INF, ""),
    ],
};

const PROCESS_INFERRED: SetDecl = SetDecl {
    name: "Process Inferred",
    entries: &[
        flag(
            "safe_unit_conflict",
            false,
            "In some cases, a proof may be missed because a newly-derived clause is deleted by a \
             limit such as max_weight.  This flag eliminates some of those cases.",
        ),
        flag(
            "back_subsume",
            true,
            "When a newly-derived clause C is kept, discard all old clauses that are subsumed by C.",
        ),
        int(
            "backsub_check",
            500,
            -1,
            INT_INF,
            "At this number of given clauses, disable back subsumption if less than 5% of kept \
             clauses have been back subsumed.",
        ),
    ],
};

const INPUT_OUTPUT: SetDecl = SetDecl {
    name: "Input/Output",
    entries: &[
        flag(
            "print_initial_clauses",
            true,
            "Show clauses after preprocessing, before the start of the search.",
        ),
        flag(
            "print_given",
            true,
            "Print clauses when they are selected as given clauses.  These clauses say a lot about \
             the progress of the search.",
        ),
        flag(
            "print_gen",
            false,
            "Print all newly-derived clauses.  This flag can cause an enormous amount of output \
             for nontrivial searches.",
        ),
        flag("print_kept", false, "Print newly-derived clauses if they pass the retention tests."),
        flag("print_labeled", false, "Print newly-kept clauses that have labels."),
        flag("print_proofs", true, "Print all proofs that are found."),
        flag(
            "print_clause_properties",
            false,
            "When a clause is printed, show some if its syntactic properties (mostly for debugging).",
        ),
        choice(
            "stats",
            "lots",
            &["none", "some", "lots", "all"],
            "How many statistics should be printed at the end of the search and in \"reports\".",
        ),
        int("report", -1, -1, INT_INF, "Output a statistics report every n seconds."),
        PROLOG_STYLE_VARIABLES,
    ],
};

const HINTS: SetDecl = SetDecl {
    name: "Hints",
    entries: &[
        flag(
            "limit_hint_matchers",
            false,
            "Apply the parameters max_weight, max_vars, max_depth, and max_literals to clauses \
             that match hints (as well as to those that do not match hints).",
        ),
        flag(
            "collect_hint_labels",
            false,
            "When equivalent hints are input, only the first is kept.  This flag causes any labels \
             on the discarded hints to be appended to the retained hint.",
        ),
        flag(
            "degrade_hints",
            true,
            "The more times a hint is matched, the less its effect becomes.",
        ),
        flag(
            "back_demod_hints",
            true,
            "This flag causes hints, as well as ordinary clauses, to be rewritten by newly-derived \
             equations.",
        ),
    ],
};

const OTHER: SetDecl = SetDecl {
    name: "Other Options",
    entries: &[int("random_seed", 0, -1, INT_INF, "Seed for random number generation.")],
};

const RULES: &[RuleDecl] = &[
    // Time limits are all expressed in seconds.
    on_non_negative("max_minutes", "max_seconds", Then::Multiply(60)),
    on_non_negative("max_hours", "max_seconds", Then::Multiply(3600)),
    on_non_negative("max_days", "max_seconds", Then::Multiply(86400)),
    on("para_units_only", true, "para_lit_limit", to_int(1)),
    on("hyper_resolution", true, "pos_hyper_resolution", to_flag(true)),
    on("hyper_resolution", false, "pos_hyper_resolution", to_flag(false)),
    on("ur_resolution", true, "pos_ur_resolution", to_flag(true)),
    on("ur_resolution", true, "neg_ur_resolution", to_flag(true)),
    on("ur_resolution", false, "pos_ur_resolution", to_flag(false)),
    on("ur_resolution", false, "neg_ur_resolution", to_flag(false)),
    on("lex_dep_demod", false, "lex_dep_demod_lim", to_int(0)),
    on("lex_dep_demod", true, "lex_dep_demod_lim", to_int(11)),
    // Given clause selection.
    on("lightest_first", true, "weight_part", to_int(1)),
    on("lightest_first", true, "age_part", to_int(0)),
    on("lightest_first", true, "false_part", to_int(0)),
    on("lightest_first", true, "true_part", to_int(0)),
    on("lightest_first", true, "random_part", to_int(0)),
    on("random_given", true, "weight_part", to_int(0)),
    on("random_given", true, "age_part", to_int(0)),
    on("random_given", true, "false_part", to_int(0)),
    on("random_given", true, "true_part", to_int(0)),
    on("random_given", true, "random_part", to_int(1)),
    on_non_negative("pick_given_ratio", "age_part", to_int(1)),
    on_non_negative("pick_given_ratio", "weight_part", Then::Multiply(1)),
    on_non_negative("pick_given_ratio", "false_part", to_int(0)),
    on_non_negative("pick_given_ratio", "true_part", to_int(0)),
    on_non_negative("pick_given_ratio", "random_part", to_int(0)),
    on("breadth_first", true, "age_part", to_int(1)),
    on("breadth_first", true, "weight_part", to_int(0)),
    on("breadth_first", true, "false_part", to_int(0)),
    on("breadth_first", true, "true_part", to_int(0)),
    on("breadth_first", true, "random_part", to_int(0)),
    // Meta options.
    on("auto_setup", true, "predicate_elim", to_flag(true)),
    on("auto_setup", true, "eq_defs", to_choice("unfold")),
    on("auto_setup", false, "predicate_elim", to_flag(false)),
    on("auto_setup", false, "eq_defs", to_choice("pass")),
    on("auto_limits", true, "max_weight", to_int(100)),
    on("auto_limits", true, "sos_limit", to_int(20000)),
    on("auto_limits", false, "max_weight", to_int(INT_INF)),
    on("auto_limits", false, "sos_limit", to_int(-1)),
    on("auto", true, "auto_inference", to_flag(true)),
    on("auto", true, "auto_setup", to_flag(true)),
    on("auto", true, "auto_limits", to_flag(true)),
    on("auto", true, "auto_denials", to_flag(true)),
    on("auto", true, "auto_process", to_flag(true)),
    on("auto", false, "auto_inference", to_flag(false)),
    on("auto", false, "auto_setup", to_flag(false)),
    on("auto", false, "auto_limits", to_flag(false)),
    on("auto", false, "auto_denials", to_flag(false)),
    on("auto", false, "auto_process", to_flag(false)),
    on("auto2", true, "auto", to_flag(true)),
    on("auto2", true, "new_constants", to_int(1)),
    on("auto2", true, "fold_denial_max", to_int(3)),
    on("auto2", true, "max_weight", to_int(200)),
    on("auto2", true, "nest_penalty", to_int(1)),
    on("auto2", true, "skolem_penalty", to_int(3)),
    on("auto2", true, "sk_constant_weight", to_int(0)),
    on("auto2", true, "prop_atom_weight", to_int(5)),
    on("auto2", true, "sort_initial_sos", to_flag(true)),
    on("auto2", true, "sos_limit", to_int(-1)),
    on("auto2", true, "max_megs", to_int(400)),
    on("auto2", true, "stats", to_choice("some")),
    on("auto2", true, "print_initial_clauses", to_flag(false)),
    on("auto2", true, "print_given", to_flag(false)),
    on("raw", true, "auto", to_flag(false)),
    on("raw", true, "ordered_res", to_flag(false)),
    on("raw", true, "ordered_para", to_flag(false)),
    on("raw", true, "literal_selection", to_choice("none")),
    on("raw", true, "backsub_check", to_int(INT_INF)),
    on("raw", true, "lightest_first", to_flag(true)),
    on("raw", true, "cac_redundancy", to_flag(false)),
    // Front-end consistency only: the program ignores these meta options,
    // but a single selection strategy and a single time unit are shown.
    on("breadth_first", true, "lightest_first", to_flag(false)),
    on("breadth_first", true, "random_given", to_flag(false)),
    on("breadth_first", true, "pick_given_ratio", to_int(-1)),
    on("lightest_first", true, "breadth_first", to_flag(false)),
    on("lightest_first", true, "random_given", to_flag(false)),
    on("lightest_first", true, "pick_given_ratio", to_int(-1)),
    on("random_given", true, "lightest_first", to_flag(false)),
    on("random_given", true, "breadth_first", to_flag(false)),
    on("random_given", true, "pick_given_ratio", to_int(-1)),
    on_non_negative("pick_given_ratio", "breadth_first", to_flag(false)),
    on_non_negative("pick_given_ratio", "lightest_first", to_flag(false)),
    on_non_negative("pick_given_ratio", "random_given", to_flag(false)),
    on_non_negative("max_minutes", "max_hours", to_int(-1)),
    on_non_negative("max_minutes", "max_days", to_int(-1)),
    on_non_negative("max_hours", "max_minutes", to_int(-1)),
    on_non_negative("max_hours", "max_days", to_int(-1)),
    on_non_negative("max_days", "max_minutes", to_int(-1)),
    on_non_negative("max_days", "max_hours", to_int(-1)),
];

pub const REGISTRY: RegistryDecl = RegistryDecl {
    program: ProgramKind::Prover9,
    sets: &[
        BASIC,
        META,
        TERM_ORDERING,
        LIMITS,
        SEARCH_PREP,
        GOALS,
        SELECT_GIVEN,
        INFERENCE_RULES,
        REWRITING,
        WEIGHTING,
        PROCESS_INFERRED,
        INPUT_OUTPUT,
        HINTS,
        OTHER,
    ],
    rules: RULES,
    // The front-end default differs from the program default.
    always_emit: &["max_seconds"],
    // The basic panel duplicates options of the other panels.
    basic_set_last: true,
};
