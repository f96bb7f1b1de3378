//! Dotted-path helpers
//!
//! Validation errors and the formatting sidecar both address locations in a
//! configuration document with dot-joined segments, e.g.
//! `rag.databases.0.embedding_strategies`. The root is the empty string.

/// Append a mapping key to a parent path
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Append a sequence index to a parent path
pub fn index(parent: &str, idx: usize) -> String {
    if parent.is_empty() {
        idx.to_string()
    } else {
        format!("{}.{}", parent, idx)
    }
}

/// Convert a JSON pointer (`/a/0/b`) to a dotted path (`a.0.b`)
///
/// The empty pointer (document root) maps to the empty string. Pointer
/// escapes are unescaped per RFC 6901 (`~1` then `~0`).
pub fn from_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        return String::new();
    }
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}
