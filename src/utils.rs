//! Shared utilities for the cache library.

/// Key of the Inputs log for an operation.
///
/// Format: `{identity}:inputs`
pub fn inputs_key(identity: &str) -> String {
    format!("{}:inputs", identity)
}

/// Key of the Outputs log for an operation.
///
/// Format: `{identity}:outputs`
pub fn outputs_key(identity: &str) -> String {
    format!("{}:outputs", identity)
}

/// Resolve an `LRANGE`-style inclusive window against a list of `len` items.
///
/// Returns the half-open `start..end` slice bounds, or `None` when the window
/// selects nothing.
pub fn resolve_range(len: usize, start: isize, end: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let end = if end < 0 { end + len } else { end.min(len - 1) };

    if len == 0 || start >= len || end < 0 || start > end {
        return None;
    }
    Some((start as usize, end as usize + 1))
}
