//! Configuration discovery and effective settings resolution.
//!
//! Solgate reads `solgate.toml` from the repository root or the closest
//! ancestor directory and merges it with CLI flags. Defaults:
//! - `block_on`: `["High", "Medium"]`
//! - `contracts`: `contracts`
//! - `report_dir`: `.` (working directory, like the analyzer itself)
//! - `output`: `human`
//! - `jobs`: `0` (sequential; values above 1 run that many invocations in parallel)
//! - `[binary].base_url`: the Vigil-3 release location
//! - `[binary].cache_dir`: `~/.solgate`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::models::policy::SeverityPolicy;
use crate::provision::{default_cache_dir, ProvisionConfig, DEFAULT_BASE_URL};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// `[binary]` section: where the analyzer comes from and where it lives.
pub struct BinaryCfg {
    pub base_url: Option<String>,
    pub cache_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `solgate.toml`.
pub struct SolgateConfig {
    pub block_on: Option<Vec<String>>,
    pub contracts: Option<String>,
    pub report_dir: Option<String>,
    pub output: Option<String>,
    pub jobs: Option<usize>,
    #[serde(default)]
    pub binary: Option<BinaryCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub policy: SeverityPolicy,
    pub contracts: PathBuf,
    pub report_dir: PathBuf,
    pub output: String,
    pub jobs: usize,
    pub provision: ProvisionConfig,
}

/// Load `solgate.toml` from `start` or its closest ancestor.
pub fn load_config(start: &Path) -> Option<SolgateConfig> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        let candidate = d.join("solgate.toml");
        if candidate.is_file() {
            let raw = fs::read_to_string(&candidate).ok()?;
            return toml::from_str(&raw).ok();
        }
        dir = d.parent();
    }
    None
}

/// Merge CLI flags over `solgate.toml` over defaults.
pub fn resolve_effective(
    repo_root: Option<&str>,
    block_on: Option<&[String]>,
    report_dir: Option<&str>,
    output: Option<&str>,
    jobs: Option<usize>,
) -> Result<Effective, String> {
    let repo_root = repo_root
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let cfg = load_config(&repo_root).unwrap_or_default();

    let policy = match (block_on, cfg.block_on.as_deref()) {
        (Some(names), _) => SeverityPolicy::from_names(names)?,
        (None, Some(names)) => SeverityPolicy::from_names(names)?,
        (None, None) => SeverityPolicy::default(),
    };

    let contracts = repo_root.join(cfg.contracts.as_deref().unwrap_or("contracts"));

    let report_dir = report_dir
        .map(PathBuf::from)
        .or_else(|| cfg.report_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let output = output
        .map(str::to_string)
        .or_else(|| cfg.output.clone())
        .unwrap_or_else(|| "human".to_string());

    let jobs = jobs.or(cfg.jobs).unwrap_or(0);

    let binary = cfg.binary.unwrap_or_default();
    let provision = ProvisionConfig {
        base_url: binary
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        cache_dir: binary
            .cache_dir
            .map(|d| expand_home(&d))
            .unwrap_or_else(default_cache_dir),
    };

    Ok(Effective {
        repo_root,
        policy,
        contracts,
        report_dir,
        output,
        jobs,
        provision,
    })
}

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::Severity;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_config() {
        let tmp = tempdir().unwrap();
        let eff =
            resolve_effective(Some(tmp.path().to_str().unwrap()), None, None, None, None).unwrap();
        assert!(eff.policy.blocks(Severity::High));
        assert!(eff.policy.blocks(Severity::Medium));
        assert!(!eff.policy.blocks(Severity::Low));
        assert_eq!(eff.contracts, tmp.path().join("contracts"));
        assert_eq!(eff.output, "human");
        assert_eq!(eff.jobs, 0);
        assert_eq!(eff.provision.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_config_file_discovered_in_ancestor() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join("solgate.toml"),
            r#"
block_on = ["High"]
contracts = "src/contracts"
jobs = 2

[binary]
base_url = "http://localhost:9999/releases"
"#,
        )
        .unwrap();
        let nested = tmp.path().join("packages/app");
        fs::create_dir_all(&nested).unwrap();
        let eff =
            resolve_effective(Some(nested.to_str().unwrap()), None, None, None, None).unwrap();
        assert!(eff.policy.blocks(Severity::High));
        assert!(!eff.policy.blocks(Severity::Medium));
        assert_eq!(eff.contracts, nested.join("src/contracts"));
        assert_eq!(eff.jobs, 2);
        assert_eq!(eff.provision.base_url, "http://localhost:9999/releases");
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join("solgate.toml"),
            "block_on = [\"High\"]\noutput = \"json\"\n",
        )
        .unwrap();
        let block = vec!["Low".to_string()];
        let eff = resolve_effective(
            Some(tmp.path().to_str().unwrap()),
            Some(&block),
            None,
            Some("human"),
            Some(1),
        )
        .unwrap();
        assert!(eff.policy.blocks(Severity::Low));
        assert!(!eff.policy.blocks(Severity::High));
        assert_eq!(eff.output, "human");
        assert_eq!(eff.jobs, 1);
    }

    #[test]
    fn test_bad_severity_name_is_an_error() {
        let tmp = tempdir().unwrap();
        let block = vec!["Catastrophic".to_string()];
        assert!(resolve_effective(
            Some(tmp.path().to_str().unwrap()),
            Some(&block),
            None,
            None,
            None
        )
        .is_err());
    }
}
