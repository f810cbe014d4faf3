//! Shared data models for the gate decision and analyzer reports.

pub mod policy;
pub mod report;

use crate::models::report::{Finding, Severity};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy, Serialize)]
/// Per-severity finding counts for one unit. Display only; the block
/// decision never reads these.
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub informational: usize,
    pub optimization: usize,
}

impl SeverityCounts {
    pub fn tally(findings: &[Finding]) -> Self {
        let mut counts = SeverityCounts::default();
        for f in findings {
            match f.impact {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
                Severity::Informational => counts.informational += 1,
                Severity::Optimization => counts.optimization += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.informational + self.optimization
    }
}

#[derive(Debug, Clone, Serialize)]
/// Verdict for one analyzed unit.
pub struct UnitVerdict {
    pub source_file: PathBuf,
    pub findings: Vec<Finding>,
    /// Findings whose severity is in the policy's blocking set.
    pub blocking: Vec<Finding>,
    pub counts: SeverityCounts,
    pub blocked: bool,
}

#[derive(Debug, Clone, Serialize)]
/// A unit that could not be analyzed or whose report could not be parsed.
/// Surfaced distinctly from "zero blocking findings".
pub struct FailedUnit {
    pub source_file: PathBuf,
    pub error: String,
}

#[derive(Debug, Serialize)]
/// Final gate decision. Built once per run, never mutated afterwards.
/// `main` translates `overall_blocked` into the process exit code.
pub struct GateResult {
    pub units: Vec<UnitVerdict>,
    pub failed: Vec<FailedUnit>,
    pub blocked_units: Vec<PathBuf>,
    pub overall_blocked: bool,
}

impl GateResult {
    /// Units attempted: analyzed plus failed.
    pub fn attempted(&self) -> usize {
        self.units.len() + self.failed.len()
    }
}
