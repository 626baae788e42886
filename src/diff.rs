//! Structural diff between two descriptor trees
//!
//! The diff walks both trees object key by object key and reports one
//! [`Change`] per differing node:
//!
//! - **Added**: key present only in the newer tree
//! - **Modified**: key present in both with a different value, or with a
//!   different type
//! - **Deleted**: key present only in the older tree
//!
//! Arrays are compared as whole values; a changed array is reported as one
//! `Modified` entry carrying the new array. Changes can be replayed onto a
//! different tree with [`apply_change`], which is how manifest edits made by
//! the package manager are folded back into the fragment.

use serde_json::{Map, Value as JsonValue};
use std::fmt;

use crate::error::{Error, Result};

/// Kind of a single change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

/// A single change entry, `path` being the object keys from the root
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: Vec<String>,
    pub change_type: ChangeType,
    /// The new value, `None` for deletions
    pub value: Option<JsonValue>,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.change_type {
            ChangeType::Added => '+',
            ChangeType::Modified => '~',
            ChangeType::Deleted => '-',
        };
        write!(f, "{} {}", marker, format_path(&self.path))
    }
}

/// Render a key path as `a.b.c`, `<root>` when empty
pub fn format_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

/// Compute the changes turning `before` into `after`
pub fn diff(before: &JsonValue, after: &JsonValue) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut path = Vec::new();
    diff_into(&mut path, before, after, &mut changes);
    changes
}

fn diff_into(
    path: &mut Vec<String>,
    before: &JsonValue,
    after: &JsonValue,
    changes: &mut Vec<Change>,
) {
    if before == after {
        return;
    }

    match (before, after) {
        (JsonValue::Object(before_map), JsonValue::Object(after_map)) => {
            for (key, before_value) in before_map {
                path.push(key.clone());
                match after_map.get(key) {
                    Some(after_value) => diff_into(path, before_value, after_value, changes),
                    None => changes.push(Change {
                        path: path.clone(),
                        change_type: ChangeType::Deleted,
                        value: None,
                    }),
                }
                path.pop();
            }
            for (key, after_value) in after_map {
                if !before_map.contains_key(key) {
                    let mut added = path.clone();
                    added.push(key.clone());
                    changes.push(Change {
                        path: added,
                        change_type: ChangeType::Added,
                        value: Some(after_value.clone()),
                    });
                }
            }
        }
        _ => changes.push(Change {
            path: path.clone(),
            change_type: ChangeType::Modified,
            value: Some(after.clone()),
        }),
    }
}

/// Replay `change` onto `target` at the same path.
///
/// Missing intermediate objects are created for additions and modifications.
/// Deleting a path that does not exist in `target` is a no-op.
pub fn apply_change(target: &mut JsonValue, change: &Change) -> Result<()> {
    let Some((last, parents)) = change.path.split_last() else {
        return match (&change.change_type, &change.value) {
            (ChangeType::Deleted, _) | (_, None) => {
                *target = JsonValue::Object(Map::new());
                Ok(())
            }
            (_, Some(value)) => {
                *target = value.clone();
                Ok(())
            }
        };
    };

    match change.change_type {
        ChangeType::Added | ChangeType::Modified => {
            let parent = navigate_json_value(target, parents)?;
            let map = parent.as_object_mut().ok_or_else(|| Error::Reconcile {
                message: format!(
                    "Expected object at '{}' while applying {}",
                    format_path(parents),
                    change
                ),
            })?;
            map.insert(
                last.clone(),
                change.value.clone().unwrap_or(JsonValue::Null),
            );
        }
        ChangeType::Deleted => {
            let mut current = target;
            for key in parents {
                match current.get_mut(key.as_str()) {
                    Some(next) => current = next,
                    None => return Ok(()),
                }
            }
            if let Some(map) = current.as_object_mut() {
                map.shift_remove(last.as_str());
            }
        }
    }
    Ok(())
}

/// Navigate to `path` within a JSON value, creating intermediate objects as
/// needed. `null` nodes on the way are turned into objects.
///
/// # Errors
///
/// Returns `Error::Reconcile` when a key has to be looked up inside a value
/// that is neither an object nor `null`.
pub fn navigate_json_value<'a>(
    value: &'a mut JsonValue,
    path: &[String],
) -> Result<&'a mut JsonValue> {
    let mut current = value;
    for key in path {
        if current.is_null() {
            *current = JsonValue::Object(Map::new());
        }
        let map = current.as_object_mut().ok_or_else(|| Error::Reconcile {
            message: format!("Expected object while navigating to '{}'", key),
        })?;
        current = map
            .entry(key.clone())
            .or_insert(JsonValue::Object(Map::new()));
    }
    Ok(current)
}
