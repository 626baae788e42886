//! Folding package manager edits back into the fragment
//!
//! Commands such as `npm install left-pad --save` edit `package.json`. Since
//! that file is generated, the edits would be lost on the next run unless
//! they are carried over to `package-dry.json`. The manifest as it was written
//! before the command is compared with the manifest on disk afterwards, and
//! each change is replayed onto the root fragment.
//!
//! Arrays merge by concatenation, ancestor items first, so a changed array in
//! the manifest still holds what the ancestors contribute. Those items are
//! removed before the array is written back, otherwise they would be appended
//! again on the next merge.
//!
//! The fragment is only rewritten when there is at least one change.

use log::{debug, info};
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

use crate::descriptor::{parse_tree, to_pretty_json, Fragment, ManifestDocument};
use crate::diff::{apply_change, diff, Change};
use crate::error::{Error, Result};
use crate::filesystem::FileStore;

/// Read the manifest the command left behind.
///
/// A missing file reads as an empty object; an unparseable one is an error.
pub fn read_manifest(store: &dyn FileStore, location: &Path) -> Result<JsonValue> {
    match store.read(location)? {
        None => Ok(JsonValue::Object(Map::new())),
        Some(text) => parse_tree(&text).map_err(|e| Error::Reconcile {
            message: format!("{} is not a valid descriptor: {}", location.display(), e),
        }),
    }
}

/// Replay onto `fragment` the changes between `original` and `mutated`, then
/// persist the fragment. Returns the applied changes.
pub fn reconcile(
    original: &ManifestDocument,
    mutated: &JsonValue,
    fragment: &mut Fragment,
    store: &dyn FileStore,
) -> Result<Vec<Change>> {
    let changes = diff(original.content(), mutated);
    if changes.is_empty() {
        debug!("No manifest change to report");
        return Ok(changes);
    }

    for change in &changes {
        debug!("Reporting {}", change);
        let own = without_inherited_items(change, original.inherited());
        apply_change(fragment.content_mut(), &own)?;
    }

    info!(
        "Reporting {} change(s) to {}",
        changes.len(),
        fragment.location().display()
    );
    store.write(fragment.location(), &to_pretty_json(fragment.content())?)?;
    Ok(changes)
}

/// Drop from an array change the items the ancestors contribute at that path.
///
/// Each inherited item removes one equal item, so duplicates the fragment adds
/// on its own survive.
fn without_inherited_items(change: &Change, inherited: &JsonValue) -> Change {
    let ancestor_items = change
        .path
        .iter()
        .try_fold(inherited, |node, key| node.get(key))
        .and_then(JsonValue::as_array);

    match (&change.value, ancestor_items) {
        (Some(JsonValue::Array(items)), Some(ancestor_items)) => {
            let mut own = items.clone();
            for item in ancestor_items {
                if let Some(position) = own.iter().position(|candidate| candidate == item) {
                    own.remove(position);
                }
            }
            Change {
                value: Some(JsonValue::Array(own)),
                ..change.clone()
            }
        }
        _ => change.clone(),
    }
}
