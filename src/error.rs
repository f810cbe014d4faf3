//! Error taxonomy for the gate.
//!
//! Fatal errors (platform resolution, download, empty directory input, config)
//! abort the run before or during setup. Per-unit errors
//! (`AnalyzerExecution`, `ReportParse`) are recorded against their unit and
//! never abort the batch.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("unsupported OS platform: {0}")]
    UnsupportedPlatform(String),

    #[error("invalid download URL: {0}")]
    InvalidUrl(String),

    #[error("download failed with status {status} for {url}")]
    DownloadStatus { url: String, status: u16 },

    #[error("too many redirects (limit {limit}) while downloading {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("redirect response from {url} carried no usable Location header")]
    MissingRedirectLocation { url: String },

    #[error("no analyzable .sol files found under {0}")]
    NoAnalyzableFiles(PathBuf),

    #[error("failed to launch analyzer for {file}: {source}")]
    AnalyzerSpawn {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("analyzer produced no report for {file} (exit code {code:?})")]
    MissingArtifact { file: PathBuf, code: Option<i32> },

    #[error("failed to parse report {artifact}: {message}")]
    ReportParse { artifact: PathBuf, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GateError>;
