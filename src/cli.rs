//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "solgate",
    version,
    about = "Slither-based deployment gate for Solidity projects",
    long_about = "Solgate runs the Slither analyzer over Solidity sources, merges the JSON reports, and blocks the pipeline when findings match the severity policy.\n\nConfiguration precedence: CLI > solgate.toml > defaults.",
    after_help = "Examples:\n  solgate analyze\n  solgate analyze contracts/Token.sol --block-on High,Medium,Low\n  solgate analyze --output json --jobs 4\n  solgate binary install",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current solgate version.")]
    Version,
    /// Analyze sources and gate on findings
    #[command(
        about = "Run the analyzer and gate on findings",
        long_about = "Analyze the given files or directories (default: contracts/), merge per-file reports into slither-report.json, and exit 1 when any unit has a finding in the blocking severity set.",
        after_help = "Examples:\n  solgate analyze\n  solgate analyze contracts lib/extra\n  solgate analyze --block-on High --report-dir build/reports"
    )]
    Analyze {
        /// Files or directories to analyze (default: the configured contracts dir)
        paths: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(
            long,
            value_delimiter = ',',
            help = "Severities that block: comma-separated subset of High,Medium,Low,Informational,Optimization"
        )]
        block_on: Option<Vec<String>>,
        #[arg(long, help = "Directory for per-file and merged JSON artifacts (default: .)")]
        report_dir: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Parallel analyzer invocations: 0 or 1 = sequential, N = N workers")]
        jobs: Option<usize>,
    },
    /// Analyzer binary management (install/path/prune)
    Binary {
        #[command(subcommand)]
        cmd: BinaryCmd,
    },
}

#[derive(Subcommand)]
/// Subcommands for `solgate binary`
pub enum BinaryCmd {
    /// Download the analyzer into the cache ahead of time
    #[command(
        about = "Install analyzer binary",
        long_about = "Resolve and download the Slither binary for this platform into the cache. A valid cached binary makes this a no-op."
    )]
    Install {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
    /// Print the resolved install path
    #[command(
        about = "Print install path",
        long_about = "Print the cache path the analyzer binary resolves to for this platform."
    )]
    Path {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
    /// Remove the cached analyzer binary
    #[command(
        about = "Prune binary cache",
        long_about = "Delete this platform's cached analyzer binary; the next analyze re-downloads it."
    )]
    Prune {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
}
