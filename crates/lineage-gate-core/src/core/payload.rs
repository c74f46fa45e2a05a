// crates/lineage-gate-core/src/core/payload.rs
// ============================================================================
// Module: Lineage Payload Navigation
// Description: Tolerant path lookups over untyped lineage event payloads.
// Purpose: Reach nested fields without failing on missing or mistyped hops.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Lineage events are accepted as untyped JSON. Lookups walk an explicit path
//! of object keys and array indices; each hop either yields the next value or
//! stops with a [`MissingHop`] describing where the walk ended. Nothing here
//! panics on malformed shapes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Value;

// ============================================================================
// SECTION: Path Segments
// ============================================================================

/// Single hop in a payload path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// Object member lookup by key.
    Key(&'a str),
    /// Array element lookup by position.
    Index(usize),
}

impl fmt::Display for PathSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "[\"{key}\"]"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Location where a payload lookup stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingHop {
    /// Path rendered up to and including the failing hop.
    pub path: String,
    /// Shape found at the failing hop (`absent` when the key or index was missing).
    pub found: &'static str,
}

impl fmt::Display for MissingHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is {}", self.path, self.found)
    }
}

// ============================================================================
// SECTION: Lookups
// ============================================================================

/// Walks `path` from `root`, returning the reached value or the failing hop.
///
/// # Errors
///
/// Returns [`MissingHop`] when a key or index is absent, or when a hop meets a
/// value of the wrong shape (for example indexing into a string).
pub fn lookup<'v>(root: &'v Value, path: &[PathSegment<'_>]) -> Result<&'v Value, MissingHop> {
    let mut current = root;
    for (position, segment) in path.iter().enumerate() {
        let next = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(*key),
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            (_, other) => {
                return Err(missing(path, position, shape_label(other)));
            }
        };
        match next {
            Some(Value::Null) | None => return Err(missing(path, position, "absent")),
            Some(value) => current = value,
        }
    }
    Ok(current)
}

/// Walks `path` from `root` and requires the reached value to be a string.
///
/// # Errors
///
/// Returns [`MissingHop`] when any hop fails or the final value is not a
/// JSON string.
pub fn lookup_str<'v>(root: &'v Value, path: &[PathSegment<'_>]) -> Result<&'v str, MissingHop> {
    let value = lookup(root, path)?;
    value.as_str().ok_or_else(|| missing(path, path.len().saturating_sub(1), shape_label(value)))
}

/// Renders the path through `failed_at` into a [`MissingHop`].
fn missing(path: &[PathSegment<'_>], failed_at: usize, found: &'static str) -> MissingHop {
    let rendered: String = path.iter().take(failed_at + 1).map(ToString::to_string).collect();
    MissingHop {
        path: format!("${rendered}"),
        found,
    }
}

/// Returns a short label for the JSON shape of `value`.
const fn shape_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions."
    )]

    use serde_json::json;

    use super::PathSegment::Index;
    use super::PathSegment::Key;
    use super::lookup;
    use super::lookup_str;

    #[test]
    fn lookup_reaches_nested_array_element() {
        let payload = json!({"run": {"plan": [{"@class": "A"}, {"@class": "B"}]}});
        let value = lookup_str(&payload, &[Key("run"), Key("plan"), Index(1), Key("@class")]);
        assert_eq!(value, Ok("B"));
    }

    #[test]
    fn lookup_reports_first_absent_hop() {
        let payload = json!({"run": {}});
        let err = lookup(&payload, &[Key("run"), Key("facets"), Key("x")]).unwrap_err();
        assert_eq!(err.path, "$[\"run\"][\"facets\"]");
        assert_eq!(err.found, "absent");
    }

    #[test]
    fn lookup_reports_shape_mismatch() {
        let payload = json!({"run": "not-an-object"});
        let err = lookup(&payload, &[Key("run"), Key("runId")]).unwrap_err();
        assert_eq!(err.path, "$[\"run\"][\"runId\"]");
        assert_eq!(err.found, "a string");
    }

    #[test]
    fn lookup_treats_null_as_absent() {
        let payload = json!({"job": {"name": null}});
        let err = lookup(&payload, &[Key("job"), Key("name")]).unwrap_err();
        assert_eq!(err.found, "absent");
    }

    #[test]
    fn lookup_str_rejects_non_string_leaf() {
        let payload = json!({"run": {"runId": 42}});
        let err = lookup_str(&payload, &[Key("run"), Key("runId")]).unwrap_err();
        assert_eq!(err.found, "a number");
    }

    #[test]
    fn lookup_on_empty_array_is_absent() {
        let payload = json!({"plan": []});
        assert!(lookup(&payload, &[Key("plan"), Index(0)]).is_err());
    }
}
