//! Slither report schema and merged-report types.
//!
//! Per-unit artifacts follow Slither's `--json` layout:
//! `{ "results": { "detectors": [ { check, impact, description }, ... ] } }`.
//! Absent `results`/`detectors` keys are treated as an empty finding list.
//! The merged artifact is a JSON array of per-unit structures in processing
//! order; nothing is deduplicated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Severity classification used by Slither detectors, highest first.
/// Ordering is for display only; blocking is decided by set membership.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    High,
    Medium,
    Low,
    Informational,
    Optimization,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Informational,
        Severity::Optimization,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Informational => "Informational",
            Severity::Optimization => "Optimization",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for sev in Severity::ALL {
            if s.eq_ignore_ascii_case(sev.as_str()) {
                return Ok(sev);
            }
        }
        Err(format!(
            "unknown severity '{}' (expected one of High, Medium, Low, Informational, Optimization)",
            s
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One issue reported by the analyzer.
pub struct Finding {
    pub check: String,
    pub impact: Severity,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
/// Raw per-unit artifact as written by `slither --json`.
pub struct SlitherReport {
    #[serde(default)]
    pub results: SlitherResults,
}

#[derive(Debug, Default, Deserialize)]
pub struct SlitherResults {
    #[serde(default)]
    pub detectors: Vec<Finding>,
}

#[derive(Debug, Clone, Serialize)]
/// One analyzed source file and its findings.
pub struct UnitReport {
    pub source_file: PathBuf,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Default, Serialize)]
/// All surviving unit reports in processing order. Immutable once built.
pub struct AggregateReport {
    pub units: Vec<UnitReport>,
}

impl AggregateReport {
    pub fn finding_count(&self) -> usize {
        self.units.iter().map(|u| u.findings.len()).sum()
    }
}
