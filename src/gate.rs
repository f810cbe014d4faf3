//! Gate decision: classify merged findings against the severity policy.
//!
//! Pure function over data; it never fails and never prints. Translating
//! `overall_blocked` into a pipeline-halting exit code is the caller's job,
//! which keeps the decision testable apart from the side effect.

use crate::models::policy::SeverityPolicy;
use crate::models::report::AggregateReport;
use crate::models::{FailedUnit, GateResult, SeverityCounts, UnitVerdict};

/// Compute the gate decision for a merged report.
///
/// A finding blocks iff its severity is in the policy set; a unit is blocked
/// iff it has at least one blocking finding; the run is blocked iff any unit
/// is. `failed` units are carried through untouched so callers can tell
/// "nothing blocked" apart from "nothing analyzed".
pub fn decide(
    aggregate: &AggregateReport,
    policy: &SeverityPolicy,
    failed: Vec<FailedUnit>,
) -> GateResult {
    let mut units = Vec::with_capacity(aggregate.units.len());
    let mut blocked_units = Vec::new();

    for unit in &aggregate.units {
        let blocking: Vec<_> = unit
            .findings
            .iter()
            .filter(|f| policy.blocks(f.impact))
            .cloned()
            .collect();
        let blocked = !blocking.is_empty();
        if blocked {
            blocked_units.push(unit.source_file.clone());
        }
        units.push(UnitVerdict {
            source_file: unit.source_file.clone(),
            findings: unit.findings.clone(),
            blocking,
            counts: SeverityCounts::tally(&unit.findings),
            blocked,
        });
    }

    let overall_blocked = !blocked_units.is_empty();
    GateResult {
        units,
        failed,
        blocked_units,
        overall_blocked,
    }
}
