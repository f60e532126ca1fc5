//! Static descriptors of the two external programs.
//!
//! A [`ProgramSpec`] knows how to invoke a program and its extraction
//! companion, how to interpret its exit codes and which markers in its output
//! denote solutions.
use pmopt::ProgramKind;
use strum::{Display, EnumIs};

/// Domain-level classification of an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum ExitOutcome {
    /// The search found what it was looking for.
    Solution,
    FatalError,
    /// A time, memory, given or kept limit was reached.
    Limit,
    /// The search space was exhausted.
    Exhausted,
    Interrupted,
    Crashed,
    /// Terminated by a signal, typically a user kill.
    Killed,
    /// Action exit or an unknown code.
    Other,
}

/// One row of an exit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitEntry {
    pub code: i32,
    pub label: &'static str,
    pub outcome: ExitOutcome,
}

const fn exit(code: i32, label: &'static str, outcome: ExitOutcome) -> ExitEntry {
    ExitEntry {
        code,
        label,
        outcome,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramSpec {
    pub program: ProgramKind,
    pub name: &'static str,
    /// What a successful search yields, "Proof" or "Model".
    pub solution_name: &'static str,
    pub search_binary: &'static str,
    pub search_args: &'static [&'static str],
    /// Companion program normalizing the raw output into solutions.
    pub extraction_binary: &'static str,
    /// Present in the raw output when at least one solution was found.
    pub solution_marker: &'static str,
    /// Occurs once per solution in the extracted payload.
    pub count_marker: &'static str,
    /// Shown when solutions were found but the exit code is not the success one.
    pub partial_message: &'static str,
    /// Output formats accepted by the extraction program.
    pub formats: &'static [&'static str],
    pub exits: &'static [ExitEntry],
}

pub const PROVER9: ProgramSpec = ProgramSpec {
    program: ProgramKind::Prover9,
    name: "Prover9",
    solution_name: "Proof",
    search_binary: "prover9",
    search_args: &[],
    extraction_binary: "prooftrans",
    solution_marker: "== PROOF ==",
    count_marker: "== PROOF ==",
    partial_message: "Some, but not all, of the requested proofs were found.",
    formats: &["standard", "parents_only", "xml", "ivy", "hints"],
    exits: &[
        exit(0, "Proof", ExitOutcome::Solution),
        exit(1, "Fatal Error", ExitOutcome::FatalError),
        exit(2, "Exhausted", ExitOutcome::Exhausted),
        exit(3, "Memory Limit", ExitOutcome::Limit),
        exit(4, "Time Limit", ExitOutcome::Limit),
        exit(5, "Given Limit", ExitOutcome::Limit),
        exit(6, "Kept Limit", ExitOutcome::Limit),
        exit(7, "Action Exit", ExitOutcome::Other),
        exit(101, "Interrupted", ExitOutcome::Interrupted),
        exit(102, "Crashed", ExitOutcome::Crashed),
        exit(-9, "Killed", ExitOutcome::Killed),
        exit(-1, "Killed", ExitOutcome::Killed),
    ],
};

pub const MACE4: ProgramSpec = ProgramSpec {
    program: ProgramKind::Mace4,
    name: "Mace4",
    solution_name: "Model",
    search_binary: "mace4",
    search_args: &["-c"],
    extraction_binary: "interpformat",
    solution_marker: "== MODEL ==",
    count_marker: "interpretation",
    partial_message: "",
    formats: &[
        "standard", "standard2", "portable", "tabular", "raw", "cooked", "tex", "xml",
    ],
    exits: &[
        exit(0, "Model(s)", ExitOutcome::Solution),
        exit(1, "Fatal Error", ExitOutcome::FatalError),
        exit(2, "Exhausted (no)", ExitOutcome::Exhausted),
        exit(3, "Exhausted (yes)", ExitOutcome::Exhausted),
        exit(4, "Time Limit (yes)", ExitOutcome::Limit),
        exit(5, "Time Limit (no)", ExitOutcome::Limit),
        exit(6, "Mem Limit (yes)", ExitOutcome::Limit),
        exit(7, "Mem Limit (no)", ExitOutcome::Limit),
        exit(101, "Interrupted", ExitOutcome::Interrupted),
        exit(102, "Crashed", ExitOutcome::Crashed),
        exit(-9, "Killed", ExitOutcome::Killed),
        exit(-1, "Killed", ExitOutcome::Killed),
    ],
};

impl ProgramSpec {
    pub fn of(program: ProgramKind) -> &'static ProgramSpec {
        match program {
            ProgramKind::Prover9 => &PROVER9,
            ProgramKind::Mace4 => &MACE4,
        }
    }

    fn entry(&self, code: i32) -> Option<&ExitEntry> {
        self.exits.iter().find(|entry| entry.code == code)
    }

    /// Human label of an exit code.
    pub fn exit_label(&self, code: i32) -> String {
        match self.entry(code) {
            Some(entry) => entry.label.to_string(),
            None => format!("unknown exit code: {}", code),
        }
    }

    pub fn outcome(&self, code: i32) -> ExitOutcome {
        self.entry(code)
            .map(|entry| entry.outcome)
            .unwrap_or(ExitOutcome::Other)
    }

    /// Whether the raw output announces at least one solution.
    pub fn exists_solution(&self, output: &str) -> bool {
        output.contains(self.solution_marker)
    }

    /// Number of solutions in an extracted payload.
    pub fn count_solutions(&self, payload: &str) -> usize {
        payload.matches(self.count_marker).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_labels() {
        assert_eq!(PROVER9.exit_label(0), "Proof");
        assert_eq!(PROVER9.exit_label(-9), "Killed");
        assert_eq!(MACE4.exit_label(3), "Exhausted (yes)");
        assert_eq!(MACE4.exit_label(42), "unknown exit code: 42");
        assert_eq!(PROVER9.exit_label(-15), "unknown exit code: -15");
    }

    #[test]
    fn test_outcomes() {
        assert!(PROVER9.outcome(0).is_solution());
        assert!(PROVER9.outcome(4).is_limit());
        assert!(MACE4.outcome(-1).is_killed());
        assert!(MACE4.outcome(2).is_exhausted());
        assert!(MACE4.outcome(55).is_other());
    }

    #[test]
    fn test_counting() {
        let payload = "interpretation( 2, [], [\n]).\ninterpretation( 3, [], [\n]).\n";
        assert_eq!(MACE4.count_solutions(payload), 2);
        assert!(PROVER9.exists_solution("...\n============================== PROOF =================================\n"));
        assert!(!PROVER9.exists_solution("SEARCH FAILED"));
    }
}
