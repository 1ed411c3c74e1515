//! Bootstrap env files: `KEY=value` lines seeded into an environment before
//! resolution.
//!
//! Only lines with exactly one `=` are kept. Nothing is trimmed or unquoted,
//! and anything else (comments, blank lines, values containing a second `=`)
//! is skipped without error.

use std::path::Path;

use crate::error::TagfigError;

/// Parse `KEY=value` lines.
///
/// Pairs with an empty key or a NUL byte are dropped as well; no environment
/// can store them.
pub fn parse_env_lines(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            if value.contains('=') || key.is_empty() || line.contains('\0') {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Read and parse a bootstrap env file.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<Vec<(String, String)>, TagfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| TagfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_env_lines(&content))
}

/// Seed the process environment from a bootstrap env file. Returns the number
/// of variables set.
///
/// # Safety
///
/// Writes process-wide state. The caller must ensure no other thread reads or
/// writes the environment while this runs, i.e. call it during startup before
/// any concurrent resolution begins. [`MapEnv::extend_from_file`] is the safe
/// alternative when the values only feed tagfig.
///
/// [`MapEnv::extend_from_file`]: crate::MapEnv::extend_from_file
pub unsafe fn set_env_from_file(path: impl AsRef<Path>) -> Result<usize, TagfigError> {
    let pairs = load_env_file(path)?;
    for (key, value) in &pairs {
        // SAFETY: forwarded to the caller, see above. Keys are non-empty and
        // free of '=' and NUL, so set_var does not panic.
        unsafe { std::env::set_var(key, value) };
    }
    tracing::debug!(count = pairs.len(), "seeded process environment");
    Ok(pairs.len())
}
