//! Supporting helpers: message prefixes and path display.

use owo_colors::OwoColorize;
use std::path::Path;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Prefix for fatal error lines on stderr.
pub fn error_prefix() -> String {
    if colors_enabled() {
        "[solgate:error]".red().bold().to_string()
    } else {
        "[solgate:error]".to_string()
    }
}

/// Prefix for advisory notes on stderr.
pub fn note_prefix() -> String {
    if colors_enabled() {
        "[solgate]".yellow().to_string()
    } else {
        "[solgate]".to_string()
    }
}

/// Prefix for informational progress lines.
pub fn info_prefix() -> String {
    if colors_enabled() {
        "[solgate]".cyan().to_string()
    } else {
        "[solgate]".to_string()
    }
}

/// Display a path relative to the working directory when possible.
pub fn rel_to_wd(path: &Path) -> String {
    let shown = std::env::current_dir()
        .ok()
        .and_then(|wd| pathdiff::diff_paths(path, wd))
        .unwrap_or_else(|| path.to_path_buf());
    shown.to_string_lossy().to_string()
}
