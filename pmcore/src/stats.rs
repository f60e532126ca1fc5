//! Search statistics reported by the programs on stderr.
//!
//! With `assign(report_stderr, N).` both programs periodically write a short
//! statistics report to stderr. Only the last report matters.
use std::sync::LazyLock;

use log::warn;
use pmopt::ProgramKind;
use regex::Regex;

static PROVER_REPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Given=(\d+)\. Generated=(\d+)\. Kept=(\d+)\. proofs=(\d+)\.User_CPU=(\d*\.\d*),")
        .expect("valid prover report pattern")
});

static FINDER_REPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Domain_size=(\d+)\. Models=(\d+)\. User_CPU=(\d*\.\d*)\.")
        .expect("valid model finder report pattern")
});

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStats {
    Proof {
        given: u64,
        generated: u64,
        kept: u64,
        proofs: u64,
        cpu_seconds: f64,
    },
    Model {
        domain_size: u64,
        models: u64,
        cpu_seconds: f64,
    },
}

impl SearchStats {
    pub fn cpu_seconds(&self) -> f64 {
        match self {
            SearchStats::Proof { cpu_seconds, .. } | SearchStats::Model { cpu_seconds, .. } => {
                *cpu_seconds
            }
        }
    }
}

fn last_containing<'a>(lines: &[&'a str], needle: &str) -> Option<&'a str> {
    lines.iter().rev().find(|line| line.contains(needle)).copied()
}

fn number(caps: &regex::Captures<'_>, index: usize) -> u64 {
    caps[index].parse().unwrap_or_default()
}

fn seconds(caps: &regex::Captures<'_>, index: usize) -> f64 {
    caps[index].parse().unwrap_or_default()
}

fn parse_prover(lines: &[&str]) -> Option<SearchStats> {
    let stats = last_containing(lines, "Given")?;
    let time = last_containing(lines, "User_CPU")?;
    let line = format!("{}{}", stats.trim(), time.trim());

    let Some(caps) = PROVER_REPORT.captures(&line) else {
        warn!("Unrecognized prover statistics: `{}`", line);
        return None;
    };
    Some(SearchStats::Proof {
        given: number(&caps, 1),
        generated: number(&caps, 2),
        kept: number(&caps, 3),
        proofs: number(&caps, 4),
        cpu_seconds: seconds(&caps, 5),
    })
}

fn parse_finder(lines: &[&str]) -> Option<SearchStats> {
    let line = last_containing(lines, "Domain_size=")?.trim();
    let Some(caps) = FINDER_REPORT.captures(line) else {
        warn!("Unrecognized model finder statistics: `{}`", line);
        return None;
    };
    Some(SearchStats::Model {
        domain_size: number(&caps, 1),
        models: number(&caps, 2),
        cpu_seconds: seconds(&caps, 3),
    })
}

/// Latest statistics of a job, possibly none yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    program: ProgramKind,
    stats: Option<SearchStats>,
}

impl ProgressInfo {
    /// Extract the last statistics report from the stderr of `program`.
    pub fn parse(program: ProgramKind, stderr: &str) -> Self {
        let lines: Vec<&str> = stderr.lines().collect();
        let stats = match program {
            ProgramKind::Prover9 => parse_prover(&lines),
            ProgramKind::Mace4 => parse_finder(&lines),
        };
        Self { program, stats }
    }

    pub fn program(&self) -> ProgramKind {
        self.program
    }

    pub fn stats(&self) -> Option<&SearchStats> {
        self.stats.as_ref()
    }

    /// Labeled values for display, `?` for unknown values.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match (&self.stats, self.program) {
            (
                Some(SearchStats::Proof {
                    given,
                    generated,
                    kept,
                    proofs,
                    cpu_seconds,
                }),
                _,
            ) => vec![
                ("CPU Seconds", format!("{:.2}", cpu_seconds)),
                ("Given", given.to_string()),
                ("Generated", generated.to_string()),
                ("Kept", kept.to_string()),
                ("Proofs", proofs.to_string()),
            ],
            (
                Some(SearchStats::Model {
                    domain_size,
                    models,
                    cpu_seconds,
                }),
                _,
            ) => vec![
                ("CPU Seconds", format!("{:.2}", cpu_seconds)),
                ("Domain Size", domain_size.to_string()),
                ("Models", models.to_string()),
            ],
            (None, ProgramKind::Prover9) => ["CPU Seconds", "Given", "Generated", "Kept", "Proofs"]
                .into_iter()
                .map(|label| (label, "?".to_string()))
                .collect(),
            (None, ProgramKind::Mace4) => ["CPU Seconds", "Domain Size", "Models"]
                .into_iter()
                .map(|label| (label, "?".to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prover_report() {
        let stderr = "\
Given=3. Generated=10. Kept=5. proofs=0.
User_CPU=0.01, System_CPU=0.00, Wall_clock=0.
Given=12. Generated=120. Kept=50. proofs=1.
User_CPU=0.25, System_CPU=0.01, Wall_clock=1.
";
        let info = ProgressInfo::parse(ProgramKind::Prover9, stderr);
        assert_eq!(
            info.stats(),
            Some(&SearchStats::Proof {
                given: 12,
                generated: 120,
                kept: 50,
                proofs: 1,
                cpu_seconds: 0.25,
            })
        );
        assert_eq!(info.fields()[0], ("CPU Seconds", "0.25".to_string()));
        assert_eq!(info.fields()[4], ("Proofs", "1".to_string()));
    }

    #[test]
    fn test_finder_report() {
        let stderr = "Domain_size=2. Models=0. User_CPU=0.00.\nDomain_size=8. Models=3. User_CPU=8.00.\n";
        let info = ProgressInfo::parse(ProgramKind::Mace4, stderr);
        assert_eq!(
            info.fields(),
            [
                ("CPU Seconds", "8.00".to_string()),
                ("Domain Size", "8".to_string()),
                ("Models", "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_report_yet() {
        let info = ProgressInfo::parse(ProgramKind::Prover9, "");
        assert!(info.stats().is_none());
        assert!(info.fields().iter().all(|(_, value)| value == "?"));
        assert_eq!(info.fields().len(), 5);

        let garbled = ProgressInfo::parse(ProgramKind::Mace4, "Domain_size=x\n");
        assert!(garbled.stats().is_none());
    }
}
