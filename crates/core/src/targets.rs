//! Parsing of the comma-separated target list supplied by the host.

use crate::error::ConfigError;

/// Split a comma-separated list of target IDs.
///
/// Entries are trimmed, blank entries are dropped, and duplicates are
/// removed keeping the first occurrence, so every returned ID maps to
/// exactly one entry in the batch result.
pub fn parse_target_ids(raw: &str) -> Vec<String> {
    normalize_target_ids(raw.split(','))
}

/// Trim, drop blanks and dedupe an already-split target list.
pub fn normalize_target_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        let id = id.as_ref().trim();
        if !id.is_empty() && !out.iter().any(|existing| existing == id) {
            out.push(id.to_string());
        }
    }
    out
}

/// Ensure a target list is non-empty before anything is dispatched.
pub fn require_targets(ids: &[String]) -> Result<(), ConfigError> {
    if ids.is_empty() {
        return Err(ConfigError::NoTargets);
    }
    Ok(())
}
