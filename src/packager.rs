//! # Packager Descriptors
//!
//! A packager descriptor tells `dry` how to drive one package manager: the
//! executable to call, the command template used to install the packages a
//! parent fragment needs, whether that command touches `package.json`, and the
//! argument mapping table.
//!
//! ```json
//! {
//!   "packageManager": "npm",
//!   "installParentCommandTemplate": "npm install --no-save {0}",
//!   "preventManifestChangeFromParentInstall": false,
//!   "mappedArguments": []
//! }
//! ```
//!
//! Descriptors are selected by key or by path, see [`PackagerDescriptor::resolve`].

use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::arguments::{ArgumentMappingRule, ArgumentTranslator};
use crate::error::{Error, Result};

/// Packager used when nothing else is requested
pub const DEFAULT_PACKAGER: &str = "npm";

/// Placeholder replaced by the dependencies in the install-parent template
pub const DEPENDENCIES_PLACEHOLDER: &str = "{0}";

const BUILTIN_DESCRIPTORS: [(&str, &str); 3] = [
    ("npm", include_str!("../packagers/npm.json")),
    ("pnpm", include_str!("../packagers/pnpm.json")),
    ("yarn", include_str!("../packagers/yarn.json")),
];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawPackagerDescriptor {
    package_manager: String,
    install_parent_command_template: String,
    #[serde(default)]
    prevent_manifest_change_from_parent_install: bool,
    #[serde(default)]
    mapped_arguments: Vec<ArgumentMappingRule>,
}

/// Description of a package manager and how `dry` integrates with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerDescriptor {
    package_manager: String,
    install_parent_command_template: String,
    prevent_manifest_change_from_parent_install: bool,
    translator: ArgumentTranslator,
}

impl PackagerDescriptor {
    /// Parse and validate a descriptor; `origin` names it in error messages
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        let raw: RawPackagerDescriptor =
            serde_json::from_str(text).map_err(|e| Error::Configuration {
                message: format!("Invalid packager descriptor {}: {}", origin, e),
                hint: None,
            })?;

        if raw.package_manager.trim().is_empty() {
            return Err(Error::Configuration {
                message: format!("Packager descriptor {} has an empty 'packageManager'", origin),
                hint: None,
            });
        }
        if !raw
            .install_parent_command_template
            .contains(DEPENDENCIES_PLACEHOLDER)
        {
            return Err(Error::Configuration {
                message: format!(
                    "Packager descriptor {} has an 'installParentCommandTemplate' without {}",
                    origin, DEPENDENCIES_PLACEHOLDER
                ),
                hint: Some("Example: \"npm install --no-save {0}\"".to_string()),
            });
        }

        Ok(Self {
            package_manager: raw.package_manager,
            install_parent_command_template: raw.install_parent_command_template,
            prevent_manifest_change_from_parent_install: raw
                .prevent_manifest_change_from_parent_install,
            translator: ArgumentTranslator::new(raw.mapped_arguments)?,
        })
    }

    /// Load one of the descriptors shipped with `dry`
    pub fn builtin(key: &str) -> Option<Result<Self>> {
        BUILTIN_DESCRIPTORS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(name, text)| Self::from_json(text, name))
    }

    /// Resolve a descriptor from a key or a path.
    ///
    /// Lookup order:
    /// 1. a descriptor file at `working_dir/value`
    /// 2. `<user config dir>/pkg-dry/packagers/<value>.json`
    /// 3. the built-in descriptors (`npm`, `pnpm`, `yarn`)
    pub fn resolve(working_dir: &Path, value: &str) -> Result<Self> {
        let custom = working_dir.join(value);
        if custom.is_file() {
            debug!("Loading packager descriptor from {}", custom.display());
            return Self::from_file(&custom);
        }

        if let Some(user_file) = user_descriptor_path(value) {
            if user_file.is_file() {
                debug!("Loading packager descriptor from {}", user_file.display());
                return Self::from_file(&user_file);
            }
        }

        Self::builtin(value).unwrap_or_else(|| {
            Err(Error::Configuration {
                message: format!(
                    "Unable to load any packager descriptor! Invalid key or path {}",
                    value
                ),
                hint: Some(format!(
                    "Use one of {} or a path to a descriptor file",
                    BUILTIN_DESCRIPTORS
                        .iter()
                        .map(|(name, _)| *name)
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            })
        })
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text, &path.display().to_string())
    }

    /// The package manager executable
    pub fn package_manager(&self) -> &str {
        &self.package_manager
    }

    pub fn install_parent_command_template(&self) -> &str {
        &self.install_parent_command_template
    }

    /// Whether `package.json` must be backed up around the install-parent command
    pub fn prevent_manifest_change_from_parent_install(&self) -> bool {
        self.prevent_manifest_change_from_parent_install
    }

    pub fn translator(&self) -> &ArgumentTranslator {
        &self.translator
    }

    /// Render the install-parent command for already formatted dependency arguments
    pub fn install_parent_command(&self, dependencies: &[String], mapped_args: &[String]) -> String {
        let mut command = self
            .install_parent_command_template
            .replacen(DEPENDENCIES_PLACEHOLDER, &dependencies.join(" "), 1);
        for arg in mapped_args {
            command.push(' ');
            command.push_str(arg);
        }
        command
    }

    /// Render the main command line forwarded to the package manager
    pub fn proxy_command(&self, args: &[String]) -> String {
        let mut command = self.package_manager.clone();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        command
    }
}

fn user_descriptor_path(value: &str) -> Option<PathBuf> {
    let file_name = format!("{}.json", value);
    if Path::new(&file_name).components().count() != 1 {
        return None;
    }
    dirs::config_dir().map(|dir| dir.join("pkg-dry").join("packagers").join(file_name))
}
