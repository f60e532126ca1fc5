//! Input checking without searching.
//!
//! Prover9 reads and checks the whole input before the search starts, so a
//! run limited to zero given clauses reports syntax errors and nothing else.
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use strum::EnumIs;

use crate::{
    extractor::run_with_input,
    job::exit_code_of,
    locator::BinaryLocator,
    program::{ExitOutcome, PROVER9},
    utils::error::{PmError, PmResult},
};

const NO_SEARCH: &str = "assign(max_given,0).\n ";

static ERROR_MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%%ERROR: ([^\n]*)").expect("valid error pattern"));
static ERROR_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)%%START ERROR%%(.*)%%END ERROR%%").expect("valid error block pattern"));

#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum SyntaxCheck {
    Okay,
    /// The input was rejected. `error` is the offending text, when reported.
    InputError {
        message: String,
        error: Option<String>,
    },
    /// Fatal error without an input diagnostic. Holds the full output.
    OtherError(String),
    /// The check itself did not complete (killed, crashed or interrupted).
    Aborted { label: String, output: String },
}

/// Classify the output of a zero-given Prover9 run by its exit code.
pub fn classify(exit_code: i32, output: &str) -> SyntaxCheck {
    match PROVER9.outcome(exit_code) {
        ExitOutcome::Killed | ExitOutcome::Crashed | ExitOutcome::Interrupted => {
            return SyntaxCheck::Aborted {
                label: PROVER9.exit_label(exit_code),
                output: output.to_string(),
            };
        }
        ExitOutcome::FatalError => {}
        _ => return SyntaxCheck::Okay,
    }

    let Some(caps) = ERROR_MESSAGE.captures(output) else {
        return SyntaxCheck::OtherError(output.to_string());
    };
    let message = format!("{}.", caps[1].trim_end().trim_end_matches('.'));
    let error = ERROR_BLOCK
        .captures(output)
        .map(|caps| caps[1].trim().to_string());

    SyntaxCheck::InputError { message, error }
}

/// Check `input` with Prover9 without searching.
pub fn syntax_check(locator: &dyn BinaryLocator, input: &str) -> PmResult<SyntaxCheck> {
    let binary = locator
        .locate(PROVER9.search_binary)
        .ok_or_else(|| PmError::ProgramNotFound {
            program: PROVER9.program,
            binary: PROVER9.search_binary.to_string(),
            searched: locator.describe(),
        })?;

    let output = run_with_input(&binary, PROVER9.search_args, &format!("{}{}", NO_SEARCH, input))?;
    let exit_code = exit_code_of(output.status);
    debug!("Syntax check exited with {}.", exit_code);

    Ok(classify(exit_code, &String::from_utf8_lossy(&output.stdout)))
}
