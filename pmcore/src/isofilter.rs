//! Removal of isomorphic models from Mace4 results.
//!
//! `isofilter` (occurrence profiles) and `isofilter2` (canonical forms) read
//! interpretations on stdin and print the nonisomorphic ones, followed by a
//! `: input=N, kept=M` summary line.
use std::sync::LazyLock;

use log::{debug, warn};
use pmopt::ProgramKind;
use regex::Regex;
use strum::{Display, EnumIs};

use crate::{
    extractor::run_with_input,
    locator::BinaryLocator,
    utils::error::{PmError, PmResult},
};

static OPERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:function|relation)\(([^,(]*)").expect("valid operation pattern"));
static SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r": input=(\d+), kept=(\d+)").expect("valid summary pattern"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum IsofilterAlgorithm {
    #[default]
    #[strum(serialize = "Occurrence Profiles")]
    OccurrenceProfiles,
    #[strum(serialize = "Canonical Forms")]
    CanonicalForms,
}

impl IsofilterAlgorithm {
    pub fn binary(self) -> &'static str {
        match self {
            IsofilterAlgorithm::OccurrenceProfiles => "isofilter",
            IsofilterAlgorithm::CanonicalForms => "isofilter2",
        }
    }
}

/// Operations of the first interpretation in `models`, equality excluded.
pub fn ops_in_interp(models: &str) -> Vec<String> {
    let Some(start) = models.find("interpretation(") else {
        return Vec::new();
    };
    let interp = match models[start + 1..].find(").") {
        Some(end) => &models[start..start + 1 + end + 2],
        None => &models[start..],
    };

    OPERATION
        .captures_iter(interp)
        .map(|caps| caps[1].to_string())
        .filter(|op| op != "=")
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsofilterOptions {
    pub algorithm: IsofilterAlgorithm,
    /// Operations compared when looking for isomorphisms, all when empty.
    pub check: Vec<String>,
    /// Operations printed for the kept models, all when empty.
    pub output: Vec<String>,
    pub ignore_constants: bool,
    /// Enclose the kept models in a list.
    pub wrap: bool,
}

impl IsofilterOptions {
    /// Check and print every operation of the first model.
    pub fn for_models(models: &str) -> Self {
        let ops = ops_in_interp(models);
        Self {
            check: ops.clone(),
            output: ops,
            ..Self::default()
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.wrap {
            args.push("wrap".to_string());
        }
        if self.ignore_constants {
            args.push("ignore_constants".to_string());
        }
        if !self.check.is_empty() {
            args.push("check".to_string());
            args.push(self.check.join(" "));
        }
        if !self.output.is_empty() {
            args.push("output".to_string());
            args.push(self.output.join(" "));
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsofilterResult {
    /// The kept models, summary included.
    pub models: String,
    pub input: usize,
    pub kept: usize,
    pub args: Vec<String>,
}

impl IsofilterResult {
    pub fn removed(&self) -> usize {
        self.input.saturating_sub(self.kept)
    }

    pub fn summary(&self) -> String {
        format!(
            "Isofilter received {} models, eliminated {}, giving {} nonisomorphic model(s).",
            self.input,
            self.removed(),
            self.kept
        )
    }
}

fn parse_summary(output: &str) -> Option<(usize, usize)> {
    let caps = SUMMARY.captures_iter(output).last()?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Filter isomorphic copies out of `models` (as printed by `interpformat`).
pub fn isofilter(
    locator: &dyn BinaryLocator,
    models: &str,
    options: &IsofilterOptions,
) -> PmResult<IsofilterResult> {
    let name = options.algorithm.binary();
    let binary = locator.locate(name).ok_or_else(|| PmError::ProgramNotFound {
        program: ProgramKind::Mace4,
        binary: name.to_string(),
        searched: locator.describe(),
    })?;

    let args = options.args();
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = run_with_input(&binary, &arg_refs, models)?;
    let failed = |reason: String| {
        warn!("`{}` failed: {}", binary.display(), reason);
        PmError::Extraction {
            binary: binary.display().to_string(),
            reason,
        }
    };

    if !output.status.success() {
        return Err(failed(format!(
            "exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let models = String::from_utf8_lossy(&output.stdout).into_owned();
    let (input, kept) =
        parse_summary(&models).ok_or_else(|| failed("no `input=N, kept=M` summary".to_string()))?;
    debug!("`{}` kept {} of {} models.", binary.display(), kept, input);

    Ok(IsofilterResult {
        models,
        input,
        kept,
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODELS: &str = "interpretation( 2, [number=1, seconds=0], [\n\
        function(e, [ 0 ]),\n\
        function(*(_,_), [ 0,1, 1,0 ]),\n\
        relation(=(_,_), [ 1,0, 0,1 ]),\n\
        relation(R(_), [ 1,0 ])]).\n\
        interpretation( 2, [number=2, seconds=0], [\n\
        function(c, [ 1 ])]).\n";

    #[test]
    fn test_ops_of_first_model() {
        assert_eq!(ops_in_interp(MODELS), ["e", "*", "R"]);
        assert!(ops_in_interp("no models here").is_empty());
    }

    #[test]
    fn test_args() {
        let mut options = IsofilterOptions::for_models(MODELS);
        assert_eq!(options.args(), ["check", "e * R", "output", "e * R"]);

        options.wrap = true;
        options.ignore_constants = true;
        options.output.clear();
        assert_eq!(options.args(), ["wrap", "ignore_constants", "check", "e * R"]);
        assert_eq!(IsofilterAlgorithm::CanonicalForms.binary(), "isofilter2");
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            parse_summary("% isofilter: input=1, kept=1\n% isofilter: input=12, kept=3\n"),
            Some((12, 3))
        );
        assert_eq!(parse_summary("interpretation(2, []).\n"), None);
    }
}
