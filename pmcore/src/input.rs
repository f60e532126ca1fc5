//! Assembly of the text given to the programs on stdin.
use std::sync::LazyLock;

use pmopt::{
    ProgramKind,
    directive::render_directives,
    session::OptionSession,
};
use regex::Regex;

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid blank run pattern"));

const COMMENT_DEPENDENCIES: &str = "% Dependencies handled by the option session";
const COMMENT_LANGUAGE: &str = "% Language Options";
const COMMENT_PROVER_OPTIONS: &str = "% Options for Prover9";
const COMMENT_FINDER_OPTIONS: &str = "% Options for Mace4";
const COMMENT_PROVER_EXTRA: &str = "% Additional input for Prover9";
const COMMENT_FINDER_EXTRA: &str = "% Additional input for Mace4";

/// Produces the full input of a job from the current option state.
pub trait InputAssembler {
    fn assemble(&self, session: &OptionSession) -> String;
}

/// Text blocks of a problem as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardInput {
    /// `op(...)` and `redeclare(...)` commands.
    pub language: String,
    pub assumptions: String,
    pub goals: String,
    /// Raw input only seen by the prover.
    pub prover_extra: String,
    /// Raw input only seen by the model finder.
    pub finder_extra: String,
}

fn conditional(out: &mut String, program: ProgramKind, comment: &str, body: &str) {
    if body.trim().is_empty() {
        return;
    }
    let guard = match program {
        ProgramKind::Prover9 => "if(Prover9).",
        ProgramKind::Mace4 => "if(Mace4).  ",
    };
    out.push_str(&format!("{} {}\n{}end_if.\n\n", guard, comment, body));
}

fn formulas(out: &mut String, list: &str, body: &str) {
    out.push_str(&format!(
        "\nformulas({}).\n\n{}\nend_of_list.\n\n",
        list,
        body.trim()
    ));
}

/// Trimmed with a single trailing newline.
fn block(text: &str) -> String {
    format!("{}\n", text.trim())
}

impl InputAssembler for StandardInput {
    fn assemble(&self, session: &OptionSession) -> String {
        let prover_options = render_directives(&session.nondefaults(ProgramKind::Prover9));
        let finder_options = render_directives(&session.nondefaults(ProgramKind::Mace4));

        let mut out = format!("set(ignore_option_dependencies). {}\n\n", COMMENT_DEPENDENCIES);
        if !self.language.trim().is_empty() {
            out.push_str(&format!("{}\n\n{}\n", COMMENT_LANGUAGE, block(&self.language)));
        }
        conditional(&mut out, ProgramKind::Prover9, COMMENT_PROVER_OPTIONS, &prover_options);
        conditional(&mut out, ProgramKind::Mace4, COMMENT_FINDER_OPTIONS, &finder_options);
        conditional(
            &mut out,
            ProgramKind::Prover9,
            COMMENT_PROVER_EXTRA,
            &block(&self.prover_extra),
        );
        conditional(
            &mut out,
            ProgramKind::Mace4,
            COMMENT_FINDER_EXTRA,
            &block(&self.finder_extra),
        );
        formulas(&mut out, "assumptions", &self.assumptions);
        formulas(&mut out, "goals", &self.goals);

        BLANK_RUN.replace_all(&out, "\n\n").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use pmopt::value::OptionValue;

    use super::*;

    #[test]
    fn test_default_session() {
        let session = OptionSession::standard().unwrap();
        let input = StandardInput {
            assumptions: "p | q.\n-p.".to_string(),
            goals: "q.".to_string(),
            ..StandardInput::default()
        };
        let text = input.assemble(&session);

        assert!(text.starts_with("set(ignore_option_dependencies)."));
        assert!(!text.contains(COMMENT_LANGUAGE));
        assert!(!text.contains(COMMENT_PROVER_EXTRA));
        assert!(text.contains("if(Prover9). % Options for Prover9\n  assign(max_seconds, 60).\nend_if."));
        assert!(text.contains("if(Mace4).   % Options for Mace4\n  assign(max_seconds, 60).\nend_if."));
        assert!(text.contains("formulas(assumptions).\n\np | q.\n-p.\nend_of_list."));
        assert!(text.ends_with("formulas(goals).\n\nq.\nend_of_list.\n\n"));
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_block_order() {
        let mut session = OptionSession::standard().unwrap();
        session
            .apply_change_by_name(ProgramKind::Mace4, "domain_size", OptionValue::Int(3))
            .unwrap();
        let input = StandardInput {
            language: "op(400, infix, \"*\").".to_string(),
            prover_extra: "formulas(hints).\nend_of_list.".to_string(),
            finder_extra: "  \n".to_string(),
            ..StandardInput::default()
        };
        let text = input.assemble(&session);

        let positions: Vec<usize> = [
            COMMENT_LANGUAGE,
            COMMENT_PROVER_OPTIONS,
            COMMENT_FINDER_OPTIONS,
            COMMENT_PROVER_EXTRA,
            "formulas(assumptions).",
            "formulas(goals).",
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(!text.contains(COMMENT_FINDER_EXTRA));
        assert!(text.contains("  assign(domain_size, 3).\n  assign(start_size, 3).\n  assign(end_size, 3).\n"));
    }
}
