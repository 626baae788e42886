//! # Descriptor Fragments and Manifests
//!
//! A project keeps its manifest as a `package-dry.json` *fragment*: a regular
//! `package.json` tree extended with two reserved sections.
//!
//! ```json
//! {
//!   "name": "child",
//!   "inheritance": {
//!     "parentReference": "parent/package-dry.json",
//!     "neededDependencies": { "parent": "file:../parent/parent-1.0.0.tgz" }
//!   },
//!   "dependencyManagement": { "left-pad": "1.3.0" },
//!   "dependencies": { "left-pad": "managed" }
//! }
//! ```
//!
//! - `inheritance.parentReference` names the fragment this one extends.
//! - `inheritance.neededDependencies` are installed before the parent is loaded,
//!   typically the package that ships the parent fragment.
//! - `dependencyManagement` holds the versions substituted for `managed`
//!   placeholders in the dependency sections.
//!
//! The merged result with both reserved sections removed is the
//! [`ManifestDocument`], the only file the wrapped package manager ever sees.
//! Both files are written with two-space indentation and one trailing newline.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name of the root fragment in the working directory
pub const FRAGMENT_FILE: &str = "package-dry.json";

/// File name of the manifest materialized for the package manager
pub const MANIFEST_FILE: &str = "package.json";

/// Backup location of the manifest around the install-parent command
pub const MANIFEST_BACKUP_FILE: &str = "package.json.bck";

/// Reserved section holding the inheritance links
pub const INHERITANCE_KEY: &str = "inheritance";

/// Reserved section holding managed dependency versions
pub const DEPENDENCY_MANAGEMENT_KEY: &str = "dependencyManagement";

/// Placeholder value deferring a version to `dependencyManagement`
pub const MANAGED_VERSION: &str = "managed";

/// Sections whose values may be `managed` placeholders
pub const DEPENDENCY_SECTIONS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// The `inheritance` section of a fragment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inheritance {
    /// The fragment this one extends
    #[serde(default)]
    pub parent_reference: Option<String>,
    /// Packages to install before the parent can be loaded
    #[serde(default)]
    pub needed_dependencies: Map<String, JsonValue>,
}

impl Inheritance {
    /// `neededDependencies` as ordered `(name, version-or-locator)` pairs.
    ///
    /// A `null` version renders as an empty string.
    pub fn needed_dependencies(&self) -> Vec<(String, String)> {
        self.needed_dependencies
            .iter()
            .map(|(name, version)| {
                let version = match version {
                    JsonValue::String(s) => s.clone(),
                    JsonValue::Null => String::new(),
                    other => other.to_string(),
                };
                (name.clone(), version)
            })
            .collect()
    }
}

/// One inheritance-capable descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    location: PathBuf,
    content: JsonValue,
}

impl Fragment {
    pub fn new<P: Into<PathBuf>>(location: P, content: JsonValue) -> Self {
        Self {
            location: location.into(),
            content,
        }
    }

    /// A fragment with an empty tree, used when the file does not exist
    pub fn empty<P: Into<PathBuf>>(location: P) -> Self {
        Self::new(location, JsonValue::Object(Map::new()))
    }

    /// Parse fragment text; the top level must be an object
    pub fn parse<P: Into<PathBuf>>(location: P, text: &str) -> Result<Self> {
        let location = location.into();
        let content = parse_tree(text).map_err(|e| Error::DescriptorLoad {
            reference: location.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(location, content))
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn content(&self) -> &JsonValue {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut JsonValue {
        &mut self.content
    }

    pub fn into_content(self) -> JsonValue {
        self.content
    }

    /// Read the `inheritance` section, defaulting when absent
    pub fn inheritance(&self) -> Result<Inheritance> {
        match self.content.get(INHERITANCE_KEY) {
            None | Some(JsonValue::Null) => Ok(Inheritance::default()),
            Some(section) => {
                Inheritance::deserialize(section).map_err(|e| Error::DescriptorLoad {
                    reference: self.location.display().to_string(),
                    message: format!("invalid '{}' section: {}", INHERITANCE_KEY, e),
                })
            }
        }
    }
}

/// The fully merged descriptor, reserved sections stripped
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    content: JsonValue,
    /// What the ancestors alone merge to, empty without a parent
    inherited: JsonValue,
}

impl ManifestDocument {
    /// Build a manifest from a merged tree, dropping the reserved sections
    pub fn from_merged(mut content: JsonValue) -> Self {
        if let Some(map) = content.as_object_mut() {
            map.shift_remove(INHERITANCE_KEY);
            map.shift_remove(DEPENDENCY_MANAGEMENT_KEY);
        }
        Self {
            content,
            inherited: JsonValue::Object(Map::new()),
        }
    }

    /// Record the tree contributed by the ancestors of the root fragment
    pub fn with_inherited(mut self, inherited: JsonValue) -> Self {
        self.inherited = inherited;
        self
    }

    pub fn content(&self) -> &JsonValue {
        &self.content
    }

    pub fn inherited(&self) -> &JsonValue {
        &self.inherited
    }

    /// Serialized form, as written to disk
    pub fn to_pretty_string(&self) -> Result<String> {
        to_pretty_json(&self.content)
    }
}

/// Parse a structured text tree; the top level must be an object
pub fn parse_tree(text: &str) -> Result<JsonValue> {
    let value: JsonValue = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(Error::Configuration {
            message: "descriptor top level must be a JSON object".to_string(),
            hint: None,
        });
    }
    Ok(value)
}

/// Serialize with two-space indentation and exactly one trailing newline
pub fn to_pretty_json(value: &JsonValue) -> Result<String> {
    let serialized = serde_json::to_string_pretty(value)?;
    Ok(ensure_trailing_newline(serialized))
}

fn ensure_trailing_newline(mut content: String) -> String {
    while content.ends_with('\n') {
        content.pop();
    }
    content.push('\n');
    content
}
