//! Deep merge of descriptor trees
//!
//! Inheritance composes fragments from the topmost ancestor down to the
//! fragment the command was run against. Each step merges a more specific
//! tree (the *source*) into the accumulated one (the *target*):
//!
//! - Objects: keys are merged recursively, keys only present in the source are added
//! - Arrays: source items are appended after the target items
//! - Scalars and type conflicts: the source value replaces the target
//!
//! ## Example
//!
//! ```
//! use pkg_dry::merge::merge_json_values;
//! use serde_json::json;
//!
//! let mut target = json!({"scripts": {"build": "tsc", "test": "mocha"}, "files": ["dist"]});
//! let source = json!({"scripts": {"test": "jest"}, "files": ["lib"]});
//! merge_json_values(&mut target, &source);
//!
//! assert_eq!(target["scripts"]["build"], "tsc");
//! assert_eq!(target["scripts"]["test"], "jest");
//! assert_eq!(target["files"], json!(["dist", "lib"]));
//! ```

use serde_json::Value as JsonValue;

/// Recursively merge `source` into `target`, `source` being the more specific tree
pub fn merge_json_values(target: &mut JsonValue, source: &JsonValue) {
    match (target, source) {
        (JsonValue::Object(target_map), JsonValue::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (JsonValue::Array(target_array), JsonValue::Array(source_array)) => {
            target_array.extend(source_array.iter().cloned());
        }
        (target, source) => *target = source.clone(),
    }
}

/// Merge a root-first chain of trees into one tree.
///
/// `chain[0]` is the fragment the command was run against and the last entry
/// is the topmost ancestor, so the merge walks the chain backwards.
pub fn merge_chain(chain: &[JsonValue]) -> JsonValue {
    let mut iter = chain.iter().rev();
    let mut merged = match iter.next() {
        Some(first) => first.clone(),
        None => JsonValue::Object(serde_json::Map::new()),
    };
    for more_specific in iter {
        merge_json_values(&mut merged, more_specific);
    }
    merged
}
