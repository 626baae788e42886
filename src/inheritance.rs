//! # Inheritance Resolution
//!
//! Builds the [`ManifestDocument`] for a fragment by walking its
//! `inheritance.parentReference` links.
//!
//! ## Process
//!
//! 1.  **Chain collection**: starting at the root fragment, each parent is
//!     loaded in turn. When a fragment declares `neededDependencies`, they are
//!     installed through the [`DependencyResolver`] *before* its parent is
//!     loaded, since the parent usually ships inside one of those packages.
//! 2.  **Cycle detection**: a reference that resolves to a fragment already on
//!     the chain aborts with `Error::CycleDetected`.
//! 3.  **Merge**: the chain is merged from the topmost ancestor down to the
//!     root, the more specific fragment winning on conflicts (see
//!     [`crate::merge`]).
//! 4.  **Managed versions**: in every dependency section, values equal to
//!     `managed` (any case) are replaced by the entry of the same name in
//!     `dependencyManagement`.
//! 5.  **Stripping**: the reserved sections are removed.
//!
//! A missing root fragment is an empty tree; a missing parent is an error.

use log::{debug, info};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::dependency::DependencyResolver;
use crate::descriptor::{
    Fragment, ManifestDocument, DEPENDENCY_MANAGEMENT_KEY, DEPENDENCY_SECTIONS, MANAGED_VERSION,
};
use crate::error::{Error, Result};
use crate::filesystem::FileStore;
use crate::merge::merge_chain;
use crate::path::resolve_reference;

/// Loads fragments by location
pub trait FragmentLoader {
    /// Load and parse the fragment at `location`, `None` when it does not exist
    fn load(&self, location: &Path) -> Result<Option<Fragment>>;
}

/// Loads fragments through a [`FileStore`]
pub struct StoreFragmentLoader<'a> {
    store: &'a dyn FileStore,
}

impl<'a> StoreFragmentLoader<'a> {
    pub fn new(store: &'a dyn FileStore) -> Self {
        Self { store }
    }
}

impl FragmentLoader for StoreFragmentLoader<'_> {
    fn load(&self, location: &Path) -> Result<Option<Fragment>> {
        match self.store.read(location)? {
            Some(text) => Fragment::parse(location, &text).map(Some),
            None => Ok(None),
        }
    }
}

/// Load the root fragment, an absent file giving an empty tree
pub fn load_root(loader: &dyn FragmentLoader, location: &Path) -> Result<Fragment> {
    Ok(loader
        .load(location)?
        .unwrap_or_else(|| Fragment::empty(location)))
}

/// Resolves a fragment into its manifest
pub struct InheritanceResolver<'a> {
    loader: &'a dyn FragmentLoader,
    dependencies: DependencyResolver<'a>,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(loader: &'a dyn FragmentLoader, dependencies: DependencyResolver<'a>) -> Self {
        Self {
            loader,
            dependencies,
        }
    }

    /// Build the manifest for `root`
    pub fn resolve(&self, root: &Fragment) -> Result<ManifestDocument> {
        let chain = self.collect_chain(root.clone())?;
        info!("Merging {} descriptor(s)", chain.len());

        let trees: Vec<JsonValue> = chain.into_iter().map(Fragment::into_content).collect();
        let mut merged = merge_chain(&trees);
        resolve_managed_versions(&mut merged)?;
        let inherited = merge_chain(trees.get(1..).unwrap_or_default());

        Ok(ManifestDocument::from_merged(merged).with_inherited(inherited))
    }

    /// Root-first list of the fragments reachable through `parentReference`
    pub fn collect_chain(&self, root: Fragment) -> Result<Vec<Fragment>> {
        let mut visited: Vec<PathBuf> = vec![root.location().to_path_buf()];
        let mut chain = Vec::new();
        let mut current = root;

        loop {
            let inheritance = current.inheritance()?;
            let reference = match inheritance.parent_reference.as_deref() {
                Some(r) if !r.trim().is_empty() => r.to_string(),
                _ => {
                    chain.push(current);
                    return Ok(chain);
                }
            };

            let needed = inheritance.needed_dependencies();
            if !needed.is_empty() {
                self.dependencies.resolve(&needed)?;
            }

            let location = resolve_reference(current.location(), &reference);
            debug!(
                "{} extends {} ({})",
                current.location().display(),
                reference,
                location.display()
            );

            if visited.contains(&location) {
                let mut cycle: Vec<String> =
                    visited.iter().map(|p| p.display().to_string()).collect();
                cycle.push(location.display().to_string());
                return Err(Error::CycleDetected {
                    cycle: cycle.join(" -> "),
                });
            }

            let parent = self
                .loader
                .load(&location)?
                .ok_or_else(|| Error::DescriptorLoad {
                    reference: reference.clone(),
                    message: format!("no descriptor found at {}", location.display()),
                })?;

            visited.push(location);
            chain.push(current);
            current = parent;
        }
    }
}

/// Replace `managed` placeholders in the dependency sections of `tree`
pub fn resolve_managed_versions(tree: &mut JsonValue) -> Result<()> {
    let management = tree
        .get(DEPENDENCY_MANAGEMENT_KEY)
        .and_then(JsonValue::as_object)
        .cloned()
        .unwrap_or_default();

    for section in DEPENDENCY_SECTIONS {
        let Some(dependencies) = tree.get_mut(section).and_then(JsonValue::as_object_mut) else {
            continue;
        };
        for (key, version) in dependencies.iter_mut() {
            let is_managed = version
                .as_str()
                .is_some_and(|v| v.eq_ignore_ascii_case(MANAGED_VERSION));
            if !is_managed {
                continue;
            }
            match management.get(key) {
                Some(managed) if !managed.is_null() => {
                    debug!("{}.{} resolved to managed version {}", section, key, managed);
                    *version = managed.clone();
                }
                _ => return Err(Error::MissingManagedVersion { key: key.clone() }),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FRAGMENT_FILE;
    use crate::filesystem::MemoryStore;
    use crate::packager::PackagerDescriptor;
    use crate::runner::RecordingRunner;
    use serde_json::json;

    fn npm() -> PackagerDescriptor {
        PackagerDescriptor::builtin("npm").unwrap().unwrap()
    }

    fn resolve_with(
        store: &MemoryStore,
        runner: &RecordingRunner,
        root: &Fragment,
    ) -> Result<ManifestDocument> {
        let packager = npm();
        let loader = StoreFragmentLoader::new(store);
        let dependencies = DependencyResolver::new(runner, store, &packager, &[]);
        InheritanceResolver::new(&loader, dependencies).resolve(root)
    }

    #[test]
    fn test_single_fragment_resolves_to_itself() {
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({
                "name": "solo",
                "version": "1.0.0",
                "dependencyManagement": {"a": "1.0.0"},
                "inheritance": {}
            }),
        );
        let manifest =
            resolve_with(&MemoryStore::new(), &RecordingRunner::new(), &root).unwrap();
        assert_eq!(manifest.content(), &json!({"name": "solo", "version": "1.0.0"}));
    }

    #[test]
    fn test_missing_root_loads_empty() {
        let store = MemoryStore::new();
        let loader = StoreFragmentLoader::new(&store);
        let root = load_root(&loader, Path::new(FRAGMENT_FILE)).unwrap();
        assert_eq!(root.content(), &json!({}));
    }

    #[test]
    fn test_parent_merged_and_needed_dependencies_installed_first() {
        let store = MemoryStore::new().with_file(
            "node_modules/parent/package-dry.json",
            r#"{"name": "parent", "license": "MIT", "scripts": {"foo": "npm help"}}"#,
        );
        let runner = RecordingRunner::new();
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({
                "name": "child",
                "inheritance": {
                    "parentReference": "parent/package-dry.json",
                    "neededDependencies": {"parent": "file:../parent/parent-1.0.0.tgz"}
                }
            }),
        );

        let manifest = resolve_with(&store, &runner, &root).unwrap();
        assert_eq!(
            runner.commands(),
            vec!["npm install --no-save file:../parent/parent-1.0.0.tgz"]
        );
        assert_eq!(manifest.content()["name"], "child");
        assert_eq!(manifest.content()["license"], "MIT");
        assert_eq!(manifest.content()["scripts"]["foo"], "npm help");
        assert!(manifest.content().get("inheritance").is_none());
    }

    #[test]
    fn test_ancestor_tree_recorded_on_manifest() {
        let store = MemoryStore::new().with_file(
            "base.json",
            r#"{"license": "MIT", "keywords": ["parent"]}"#,
        );
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({
                "inheritance": {"parentReference": "./base.json"},
                "keywords": ["child"]
            }),
        );
        let manifest = resolve_with(&store, &RecordingRunner::new(), &root).unwrap();
        assert_eq!(manifest.content()["keywords"], json!(["parent", "child"]));
        assert_eq!(
            manifest.inherited(),
            &json!({"license": "MIT", "keywords": ["parent"]})
        );
    }

    #[test]
    fn test_managed_version_resolved_from_child_management() {
        let store = MemoryStore::new().with_file(
            "node_modules/parent/package-dry.json",
            r#"{"dependencies": {"a": "1.0"}}"#,
        );
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({
                "inheritance": {"parentReference": "parent/package-dry.json"},
                "dependencies": {"a": "managed", "b": "3.0"},
                "dependencyManagement": {"a": "2.0", "b": "9.9"}
            }),
        );
        let manifest = resolve_with(&store, &RecordingRunner::new(), &root).unwrap();
        assert_eq!(manifest.content()["dependencies"]["a"], "2.0");
        assert_eq!(manifest.content()["dependencies"]["b"], "3.0");
        assert!(manifest.content().get("dependencyManagement").is_none());
    }

    #[test]
    fn test_managed_versions_inherited_from_parent_management() {
        let store = MemoryStore::new().with_file(
            "node_modules/parent/package-dry.json",
            r#"{"dependencyManagement": {"dfirst": "parentValue", "ddfirst": "parentValue"}}"#,
        );
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({
                "inheritance": {"parentReference": "parent/package-dry.json"},
                "dependencies": {"dfirst": "MANAGED", "dsecond": "childValue"},
                "devDependencies": {"ddfirst": "Managed"}
            }),
        );
        let manifest = resolve_with(&store, &RecordingRunner::new(), &root).unwrap();
        assert_eq!(manifest.content()["dependencies"]["dfirst"], "parentValue");
        assert_eq!(manifest.content()["dependencies"]["dsecond"], "childValue");
        assert_eq!(manifest.content()["devDependencies"]["ddfirst"], "parentValue");
    }

    #[test]
    fn test_missing_managed_version_names_key() {
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({"dependencies": {"left-pad": "managed"}}),
        );
        let err = resolve_with(&MemoryStore::new(), &RecordingRunner::new(), &root).unwrap_err();
        assert!(matches!(err, Error::MissingManagedVersion { ref key } if key == "left-pad"));
    }

    #[test]
    fn test_missing_parent_is_descriptor_load_error() {
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({"inheritance": {"parentReference": "./missing.json"}}),
        );
        let err = resolve_with(&MemoryStore::new(), &RecordingRunner::new(), &root).unwrap_err();
        assert!(matches!(err, Error::DescriptorLoad { ref reference, .. } if reference == "./missing.json"));
    }

    #[test]
    fn test_malformed_parent_is_descriptor_load_error() {
        let store = MemoryStore::new().with_file("base.json", "{ nope");
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({"inheritance": {"parentReference": "./base.json"}}),
        );
        let err = resolve_with(&store, &RecordingRunner::new(), &root).unwrap_err();
        assert!(matches!(err, Error::DescriptorLoad { .. }));
    }

    #[test]
    fn test_three_level_chain_order() {
        let store = MemoryStore::new()
            .with_file(
                "base/mid.json",
                r#"{"inheritance": {"parentReference": "./top.json"}, "description": "mid", "keywords": ["mid"]}"#,
            )
            .with_file(
                "base/top.json",
                r#"{"description": "top", "license": "ISC", "keywords": ["top"]}"#,
            );
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({"inheritance": {"parentReference": "./base/mid.json"}, "keywords": ["child"]}),
        );
        let manifest = resolve_with(&store, &RecordingRunner::new(), &root).unwrap();
        assert_eq!(manifest.content()["description"], "mid");
        assert_eq!(manifest.content()["license"], "ISC");
        assert_eq!(
            manifest.content()["keywords"],
            json!(["top", "mid", "child"])
        );
    }

    #[test]
    fn test_cycle_detected() {
        let store = MemoryStore::new()
            .with_file("a.json", r#"{"inheritance": {"parentReference": "./b.json"}}"#)
            .with_file("b.json", r#"{"inheritance": {"parentReference": "./a.json"}}"#);
        let root = Fragment::new(
            "a.json",
            json!({"inheritance": {"parentReference": "./b.json"}}),
        );
        let err = resolve_with(&store, &RecordingRunner::new(), &root).unwrap_err();
        match err {
            Error::CycleDetected { cycle } => assert_eq!(cycle, "a.json -> b.json -> a.json"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_failed_install_stops_resolution() {
        let runner = RecordingRunner::failing_on("install");
        let root = Fragment::new(
            FRAGMENT_FILE,
            json!({"inheritance": {
                "parentReference": "parent/package-dry.json",
                "neededDependencies": {"parent": "1.0.0"}
            }}),
        );
        let err = resolve_with(&MemoryStore::new(), &runner, &root).unwrap_err();
        assert!(matches!(err, Error::ExternalCommand { .. }));
    }
}
