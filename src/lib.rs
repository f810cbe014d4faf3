//! Solgate core library.
//!
//! This crate exposes programmatic APIs for gating a deployment pipeline on
//! Slither static-analysis findings: acquiring the analyzer binary, running
//! it over a set of Solidity sources, merging the per-file JSON reports, and
//! deciding pass/block against a severity policy.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `provision`: Analyzer binary download, atomic install, and caching.
//! - `collect`: Deterministic expansion of input paths into source files.
//! - `analyze`: Per-file analyzer invocation and batch orchestration.
//! - `report`: Per-unit report merging and merged-artifact persistence.
//! - `gate`: Pure pass/block decision against the severity policy.
//! - `models`: Data models for findings, reports, policy, and the verdict.
//! - `output`: Human/JSON printers for the gate result.
//! - `error`: Error taxonomy shared across modules.
//! - `utils`: Supporting helpers.
pub mod analyze;
pub mod cli;
pub mod collect;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod output;
pub mod provision;
pub mod report;
pub mod utils;
