//! Dotted field path resolution against config entries.

use serde_json::{Map, Value};

use crate::domain::errors::SelectError;
use crate::domain::model::Entry;

/// How a missing path is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// A missing path is a [`SelectError::MissingField`].
    Strict,
    /// A missing (or `null`) path resolves to nothing.
    Lenient,
}

/// Resolve `path` against an entry.
///
/// A top-level field whose name matches `path` verbatim (dots included) wins over a dotted
/// traversal, so mapping roles may name either flat fields or nested ones.
pub fn extract<'a>(
    entry: &'a Entry,
    path: &str,
    mode: Extraction,
) -> Result<Option<&'a Value>, SelectError> {
    let resolved = entry.fields().and_then(|fields| resolve_in(fields, path));
    match (resolved, mode) {
        (Some(value), Extraction::Strict) => Ok(Some(value)),
        (Some(Value::Null), Extraction::Lenient) | (None, Extraction::Lenient) => Ok(None),
        (Some(value), Extraction::Lenient) => Ok(Some(value)),
        (None, Extraction::Strict) => Err(SelectError::missing_field(path)),
    }
}

/// Strict extraction: the path must resolve.
pub fn extract_strict<'a>(entry: &'a Entry, path: &str) -> Result<&'a Value, SelectError> {
    extract(entry, path, Extraction::Strict)?.ok_or_else(|| SelectError::missing_field(path))
}

/// Lenient extraction: missing paths and `null` values yield `None`.
pub fn extract_lenient<'a>(entry: &'a Entry, path: &str) -> Option<&'a Value> {
    let value = entry.fields().and_then(|fields| resolve_in(fields, path))?;
    (!value.is_null()).then_some(value)
}

/// Resolve a dotted path inside a plain value tree.
pub fn resolve_value<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    match root {
        Value::Object(map) => resolve_in(map, path),
        other => path
            .split('.')
            .try_fold(other, |current, segment| step(current, segment)),
    }
}

fn resolve_in<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = fields.get(path) {
        return Some(value);
    }

    let mut segments = path.split('.');
    let first = fields.get(segments.next()?)?;
    segments.try_fold(first, |current, segment| step(current, segment))
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => {
            let index = segment.parse::<usize>().ok()?;
            items.get(index)
        }
        _ => None,
    }
}
