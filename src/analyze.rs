//! Analyzer invocation and batch orchestration.
//!
//! One invocation per source file: `slither <absolute path> --json <artifact>`
//! with inherited stdio so analyzer progress stays visible. Success is
//! decided by artifact existence, not exit code — Slither versions disagree
//! on the exit code used when findings are present, and the report on disk is
//! the only contract both sides honor.

use crate::collect;
use crate::error::{GateError, Result};
use crate::models::FailedUnit;
use crate::report::MERGED_ARTIFACT;
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Runs the analyzer binary against single files.
pub struct Invoker {
    binary: PathBuf,
    report_dir: PathBuf,
}

/// Artifact file name for one source file:
/// `slither-<sanitized path>-<hash>.json`. The full input path is sanitized
/// (not just the file name), and a short hash of the unsanitized path is
/// appended so distinct inputs that sanitize to the same string still get
/// distinct artifacts.
pub fn artifact_name(source: &Path) -> String {
    use std::hash::{Hash, Hasher};
    static SANITIZE: OnceLock<Regex> = OnceLock::new();
    let re = SANITIZE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));
    let flat = source.to_string_lossy();
    let flat = flat.trim_start_matches(['/', '.']);
    let mut h = std::collections::hash_map::DefaultHasher::new();
    source.hash(&mut h);
    format!(
        "slither-{}-{:08x}.json",
        re.replace_all(flat, "_"),
        h.finish() as u32
    )
}

impl Invoker {
    pub fn new(binary: PathBuf, report_dir: PathBuf) -> Self {
        Invoker { binary, report_dir }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        self.report_dir.join(artifact_name(source))
    }

    /// Analyze one file, returning the path of the JSON artifact it produced.
    ///
    /// Any stale artifact at the target path is removed first so a failed run
    /// cannot be masked by a report from an earlier success.
    pub fn invoke(&self, source: &Path) -> Result<PathBuf> {
        let absolute = fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf());
        let artifact = self.artifact_path(source);
        if artifact.exists() {
            fs::remove_file(&artifact)?;
        }

        let status = Command::new(&self.binary)
            .arg(&absolute)
            .arg("--json")
            .arg(&artifact)
            .status()
            .map_err(|source_err| GateError::AnalyzerSpawn {
                file: source.to_path_buf(),
                source: source_err,
            })?;

        if !artifact.exists() {
            return Err(GateError::MissingArtifact {
                file: source.to_path_buf(),
                code: status.code(),
            });
        }
        Ok(artifact)
    }
}

/// One successfully analyzed unit and where its artifact landed.
#[derive(Debug, Clone)]
pub struct UnitArtifact {
    pub source_file: PathBuf,
    pub artifact: PathBuf,
}

/// Batch result: surviving artifacts and per-unit failures, both in
/// collection order.
#[derive(Debug, Default)]
pub struct RunOutput {
    pub artifacts: Vec<UnitArtifact>,
    pub failures: Vec<FailedUnit>,
}

/// Analyze every file under the given inputs.
///
/// Per-file failures are recorded and the batch continues; one broken
/// contract should not hide findings in the rest of the suite. `jobs` of 0
/// or 1 runs sequentially; `jobs > 1` runs that many invocations on a rayon
/// pool, with outcomes carrying their collection index so ordering never
/// depends on completion order.
pub fn run(invoker: &Invoker, inputs: &[PathBuf], jobs: usize) -> Result<RunOutput> {
    let files = collect::collect_all(inputs)?;

    fs::create_dir_all(invoker.report_dir())?;
    // A fresh run owns the merged artifact; drop the previous one up front.
    let merged = invoker.report_dir().join(MERGED_ARTIFACT);
    if merged.exists() {
        fs::remove_file(&merged)?;
    }

    let mut outcomes: Vec<(usize, PathBuf, Result<PathBuf>)> = if jobs <= 1 {
        files
            .iter()
            .enumerate()
            .map(|(i, f)| (i, f.clone(), invoker.invoke(f)))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        pool.install(|| {
            files
                .par_iter()
                .enumerate()
                .map(|(i, f)| (i, f.clone(), invoker.invoke(f)))
                .collect()
        })
    };
    outcomes.sort_by_key(|(i, _, _)| *i);

    let mut out = RunOutput::default();
    for (_, source_file, result) in outcomes {
        match result {
            Ok(artifact) => out.artifacts.push(UnitArtifact {
                source_file,
                artifact,
            }),
            Err(err) => out.failures.push(FailedUnit {
                source_file,
                error: err.to_string(),
            }),
        }
    }
    Ok(out)
}
