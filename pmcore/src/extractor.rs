//! Post-processing of raw program output.
//!
//! The companion programs (`prooftrans`, `interpformat`) read a raw output on
//! stdin and print the normalized solutions. They exit with 0 when at least
//! one solution was printed and with 2 when there was none.
use std::{
    io::{Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use log::{debug, warn};
use strum::EnumIs;

use crate::{
    magic::EXTRACTION_NO_SOLUTION,
    program::ProgramSpec,
    utils::error::{PmError, PmResult},
};

/// Result of running the extraction program.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum Extraction {
    /// Normalized solutions.
    Found(String),
    /// The output holds no solution (eg. proofs were not printed).
    NoSolution,
    /// The extraction program failed. Holds the message shown to the user.
    Failed(String),
}

impl Extraction {
    pub fn payload(&self) -> Option<&str> {
        match self {
            Extraction::Found(payload) => Some(payload),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultExtractor {
    binary: PathBuf,
    solution_name: &'static str,
}

pub(crate) fn run_with_input(binary: &Path, args: &[&str], input: &str) -> std::io::Result<Output> {
    let mut stdin = tempfile::tempfile()?;
    stdin.write_all(input.as_bytes())?;
    stdin.seek(SeekFrom::Start(0))?;

    Command::new(binary)
        .args(args)
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
}

impl ResultExtractor {
    pub fn new(binary: impl Into<PathBuf>, spec: &ProgramSpec) -> Self {
        Self {
            binary: binary.into(),
            solution_name: spec.solution_name,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn failure(&self) -> Extraction {
        Extraction::Failed(format!(
            "There was an error extracting the {}.",
            self.solution_name
        ))
    }

    /// Run the extraction program on a raw output.
    pub fn extract(&self, raw_output: &str) -> Extraction {
        let output = match run_with_input(&self.binary, &[], raw_output) {
            Ok(output) => output,
            Err(err) => {
                warn!("Cannot run `{}`: {}", self.binary.display(), err);
                return self.failure();
            }
        };

        match output.status.code() {
            Some(0) => {
                debug!("`{}` extracted {} bytes.", self.binary.display(), output.stdout.len());
                Extraction::Found(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Some(EXTRACTION_NO_SOLUTION) => Extraction::NoSolution,
            code => {
                warn!(
                    "`{}` exited with {:?}: {}",
                    self.binary.display(),
                    code,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                self.failure()
            }
        }
    }

    /// Rerun the extraction program on extracted solutions with extra
    /// arguments, eg. `["xml"]` or `["tabular"]`.
    pub fn reformat(&self, solution: &str, args: &[&str]) -> PmResult<String> {
        let output = run_with_input(&self.binary, args, solution)?;
        if !output.status.success() {
            return Err(PmError::Extraction {
                binary: self.binary.display().to_string(),
                reason: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
