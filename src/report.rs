//! Per-unit report merging and merged-artifact persistence.
//!
//! A malformed per-unit artifact drops that unit from the aggregate with a
//! recorded failure; it never aborts the merge. Losing one unit's findings is
//! preferred over aborting the whole gate for an unrelated parse issue.

use crate::analyze::UnitArtifact;
use crate::error::{GateError, Result};
use crate::models::report::{AggregateReport, SlitherReport, UnitReport};
use crate::models::FailedUnit;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the merged artifact, written once per run into the report
/// directory. Layout: a JSON array with one entry per unit, in processing
/// order, each carrying the source file and the unit's `results.detectors`.
pub const MERGED_ARTIFACT: &str = "slither-report.json";

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub aggregate: AggregateReport,
    pub parse_failures: Vec<FailedUnit>,
}

/// Parse each per-unit artifact and merge them in processing order.
/// No deduplication: every finding of every surviving unit is retained.
pub fn merge(units: &[UnitArtifact]) -> MergeOutcome {
    let mut out = MergeOutcome::default();
    for unit in units {
        match read_unit(&unit.artifact) {
            Ok(report) => out.aggregate.units.push(UnitReport {
                source_file: unit.source_file.clone(),
                findings: report.results.detectors,
            }),
            Err(err) => out.parse_failures.push(FailedUnit {
                source_file: unit.source_file.clone(),
                error: err.to_string(),
            }),
        }
    }
    out
}

fn read_unit(artifact: &Path) -> Result<SlitherReport> {
    let raw = fs::read_to_string(artifact)?;
    serde_json::from_str(&raw).map_err(|e| GateError::ReportParse {
        artifact: artifact.to_path_buf(),
        message: e.to_string(),
    })
}

/// Persist the merged artifact. Called exactly once per run, after every
/// unit has been merged; nothing else writes this path.
pub fn write_merged(report_dir: &Path, aggregate: &AggregateReport) -> Result<PathBuf> {
    let entries: Vec<_> = aggregate
        .units
        .iter()
        .map(|u| {
            json!({
                "source_file": u.source_file,
                "results": { "detectors": u.findings },
            })
        })
        .collect();
    let path = report_dir.join(MERGED_ARTIFACT);
    let body = serde_json::to_string_pretty(&entries).map_err(|e| GateError::ReportParse {
        artifact: path.clone(),
        message: e.to_string(),
    })?;
    fs::write(&path, body)?;
    Ok(path)
}
