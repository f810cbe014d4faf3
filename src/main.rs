//! Solgate CLI binary entry point.
//! Delegates to modules for provisioning/analysis/gating and prints results.
//!
//! Exit codes: 0 clean pass, 1 gate blocked, 2 fatal error.

mod analyze;
mod cli;
mod collect;
mod config;
mod error;
mod gate;
mod models;
mod output;
mod provision;
mod report;
mod utils;

use clap::Parser;
use cli::{BinaryCmd, Cli, Commands};
use provision::Provisioner;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::Analyze {
            paths,
            repo_root,
            block_on,
            report_dir,
            output,
            jobs,
        } => run_analyze(
            paths,
            repo_root.as_deref(),
            block_on.as_deref(),
            report_dir.as_deref(),
            output.as_deref(),
            jobs,
        ),
        Commands::Binary { cmd } => run_binary(cmd),
    }
}

fn run_analyze(
    paths: Vec<String>,
    repo_root: Option<&str>,
    block_on: Option<&[String]>,
    report_dir: Option<&str>,
    output: Option<&str>,
    jobs: Option<usize>,
) -> ExitCode {
    let eff = match config::resolve_effective(repo_root, block_on, report_dir, output, jobs) {
        Ok(eff) => eff,
        Err(msg) => {
            eprintln!("{} {}", utils::error_prefix(), msg);
            return ExitCode::from(2);
        }
    };
    // Friendly note if no solgate config was found
    if config::load_config(&eff.repo_root).is_none() && eff.output != "json" {
        eprintln!(
            "{} {}",
            utils::note_prefix(),
            "No solgate.toml found; using defaults."
        );
    }

    let inputs: Vec<PathBuf> = if paths.is_empty() {
        vec![eff.contracts.clone()]
    } else {
        paths.iter().map(|p| eff.repo_root.join(p)).collect()
    };

    // No analysis can proceed without the binary; acquisition failures are fatal.
    let provisioner = Provisioner::new(eff.provision.clone());
    let binary = match provisioner.ensure_binary() {
        Ok(path) => path,
        Err(err) => {
            eprintln!("{} {}", utils::error_prefix(), err);
            return ExitCode::from(2);
        }
    };

    if eff.output != "json" {
        eprintln!(
            "{} Analyzing {} ...",
            utils::info_prefix(),
            inputs
                .iter()
                .map(|p| utils::rel_to_wd(p))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let invoker = analyze::Invoker::new(binary, eff.report_dir.clone());
    let run = match analyze::run(&invoker, &inputs, eff.jobs) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("{} {}", utils::error_prefix(), err);
            return ExitCode::from(2);
        }
    };

    let merged = report::merge(&run.artifacts);
    if let Err(err) = report::write_merged(&eff.report_dir, &merged.aggregate) {
        eprintln!("{} {}", utils::error_prefix(), err);
        return ExitCode::from(2);
    }

    let mut failed = run.failures;
    failed.extend(merged.parse_failures);
    let result = gate::decide(&merged.aggregate, &eff.policy, failed);
    output::print_gate(&result, &eff.output);

    if result.overall_blocked {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_binary(cmd: BinaryCmd) -> ExitCode {
    let provisioner_for = |repo_root: Option<&str>| -> Result<Provisioner, String> {
        let eff = config::resolve_effective(repo_root, None, None, None, None)?;
        Ok(Provisioner::new(eff.provision))
    };

    match cmd {
        BinaryCmd::Install { repo_root } => match provisioner_for(repo_root.as_deref()) {
            Ok(prov) => match prov.ensure_binary() {
                Ok(path) => {
                    println!("installed: {}", path.to_string_lossy());
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("{} {}", utils::error_prefix(), err);
                    ExitCode::from(2)
                }
            },
            Err(msg) => {
                eprintln!("{} {}", utils::error_prefix(), msg);
                ExitCode::from(2)
            }
        },
        BinaryCmd::Path { repo_root } => match provisioner_for(repo_root.as_deref()) {
            Ok(prov) => match prov.install_path() {
                Ok(path) => {
                    println!("{}", path.to_string_lossy());
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("{} {}", utils::error_prefix(), err);
                    ExitCode::from(2)
                }
            },
            Err(msg) => {
                eprintln!("{} {}", utils::error_prefix(), msg);
                ExitCode::from(2)
            }
        },
        BinaryCmd::Prune { repo_root } => match provisioner_for(repo_root.as_deref()) {
            Ok(prov) => match prov.prune() {
                Ok(true) => {
                    println!("pruned");
                    ExitCode::SUCCESS
                }
                Ok(false) => {
                    println!("nothing to prune");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("{} {}", utils::error_prefix(), err);
                    ExitCode::from(2)
                }
            },
            Err(msg) => {
                eprintln!("{} {}", utils::error_prefix(), msg);
                ExitCode::from(2)
            }
        },
    }
}
