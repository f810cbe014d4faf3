//! Input path expansion into an ordered list of analyzable files.
//!
//! Directories are walked with an explicit work stack (no native recursion),
//! depth-first with entries sorted by name inside each directory, so two
//! walks over an unchanged tree yield identical order. Only `.sol` files are
//! kept, and the `.t.sol` test-contract suffix is excluded.

use crate::error::{GateError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const SOURCE_EXT: &str = ".sol";
const TEST_SUFFIX: &str = ".t.sol";

/// True for files the analyzer should see: `*.sol` but not `*.t.sol`.
fn is_analyzable(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    name.ends_with(SOURCE_EXT) && !name.ends_with(TEST_SUFFIX)
}

/// Expand one input path into analyzable files.
///
/// An explicit file is returned as-is, even with a non-`.sol` extension;
/// passing a specific file is the caller saying "analyze this". A directory
/// with no matches is an error, since a gate that silently checks nothing
/// would read as a clean pass.
pub fn collect(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut stack = vec![input.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();
        // Reverse so the stack pops subdirectories in sorted order.
        for entry in entries.iter().rev() {
            if entry.is_dir() {
                stack.push(entry.clone());
            }
        }
        for entry in entries {
            if entry.is_file() && is_analyzable(&entry) {
                files.push(entry);
            }
        }
    }

    if files.is_empty() {
        return Err(GateError::NoAnalyzableFiles(input.to_path_buf()));
    }
    Ok(files)
}

/// Expand several inputs, concatenated in input order.
pub fn collect_all(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        files.extend(collect(input)?);
    }
    Ok(files)
}
