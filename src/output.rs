//! Output rendering for the gate result.
//!
//! Supports `human` (default) and `json` outputs. Core modules return data
//! and never print; everything human-facing funnels through here.

use crate::models::{GateResult, UnitVerdict};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn unit_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

/// Print the gate result in the requested format.
pub fn print_gate(res: &GateResult, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_gate_json(res)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for unit in &res.units {
                print_unit(unit, color);
            }
            for f in &res.failed {
                let icon = if color {
                    "✖".red().to_string()
                } else {
                    "✖".to_string()
                };
                println!(
                    "{} {:<25} FAILED ({})",
                    icon,
                    unit_name(&f.source_file),
                    f.error
                );
            }
            println!();
            if !res.failed.is_empty() {
                // Distinct from "0 blocking findings": these were never analyzed.
                let line = format!(
                    "{} of {} files failed to analyze; their findings are unknown.",
                    res.failed.len(),
                    res.attempted()
                );
                if color {
                    eprintln!("{}", line.yellow());
                } else {
                    eprintln!("{}", line);
                }
            }
            if res.overall_blocked {
                let head = "Deployment blocked due to vulnerabilities:";
                if color {
                    eprintln!("{}", head.red().bold());
                } else {
                    eprintln!("{}", head);
                }
                for unit in res.units.iter().filter(|u| u.blocked) {
                    eprintln!(
                        " - {} ({} blocking findings)",
                        unit_name(&unit.source_file),
                        unit.blocking.len()
                    );
                }
            } else {
                let line = "All contracts passed security checks.";
                if color {
                    println!("{}", line.green());
                } else {
                    println!("{}", line);
                }
            }
        }
    }
}

fn print_unit(unit: &UnitVerdict, color: bool) {
    let name = unit_name(&unit.source_file);
    let total = unit.counts.total();
    if total == 0 {
        let icon = if color {
            "✅".green().to_string()
        } else {
            "OK".to_string()
        };
        println!("{} {:<25} PASS (0 issues)", icon, name);
        return;
    }

    let (icon, label) = if unit.blocked {
        let l = if color {
            "BLOCK".red().bold().to_string()
        } else {
            "BLOCK".to_string()
        };
        ("❌".to_string(), l)
    } else {
        let l = if color {
            "WARN".yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        ("⚠".to_string(), l)
    };
    println!(
        "{} {:<25} {} ({} issues: {} high, {} medium, {} low, {} info, {} opt)",
        icon,
        name,
        label,
        total,
        unit.counts.high,
        unit.counts.medium,
        unit.counts.low,
        unit.counts.informational,
        unit.counts.optimization
    );

    // Short excerpt of the top blocking findings.
    for f in unit.blocking.iter().take(3) {
        println!(
            "   - [{}] {}: {}",
            f.impact,
            f.check,
            excerpt(&f.description, 60)
        );
    }
}

/// JSON form: the full result plus a compact summary block.
pub fn compose_gate_json(res: &GateResult) -> JsonVal {
    json!({
        "units": res.units,
        "failed": res.failed,
        "blocked_units": res.blocked_units,
        "overall_blocked": res.overall_blocked,
        "summary": {
            "analyzed": res.units.len(),
            "failed": res.failed.len(),
            "blocked": res.blocked_units.len(),
            "findings": res.units.iter().map(|u| u.findings.len()).sum::<usize>(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{Finding, Severity};
    use crate::models::{FailedUnit, SeverityCounts};
    use std::path::PathBuf;

    #[test]
    fn test_excerpt_truncates_long_descriptions() {
        assert_eq!(excerpt("short", 60), "short");
        let long = "x".repeat(80);
        let cut = excerpt(&long, 60);
        assert_eq!(cut.chars().count(), 63);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_compose_gate_json_summary() {
        let finding = Finding {
            check: "reentrancy".into(),
            impact: Severity::High,
            description: "d".into(),
        };
        let unit = UnitVerdict {
            source_file: PathBuf::from("contracts/Vault.sol"),
            findings: vec![finding.clone()],
            blocking: vec![finding],
            counts: SeverityCounts {
                high: 1,
                ..Default::default()
            },
            blocked: true,
        };
        let res = GateResult {
            units: vec![unit],
            failed: vec![FailedUnit {
                source_file: PathBuf::from("contracts/Broken.sol"),
                error: "spawn failed".into(),
            }],
            blocked_units: vec![PathBuf::from("contracts/Vault.sol")],
            overall_blocked: true,
        };
        let j = compose_gate_json(&res);
        assert_eq!(j["summary"]["analyzed"], 1);
        assert_eq!(j["summary"]["failed"], 1);
        assert_eq!(j["summary"]["blocked"], 1);
        assert_eq!(j["summary"]["findings"], 1);
        assert_eq!(j["overall_blocked"], true);
        assert_eq!(j["units"][0]["blocking"][0]["impact"], "High");
    }
}
