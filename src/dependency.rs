//! Installation of the packages a parent fragment needs
//!
//! Before a parent fragment shipped in a package can be loaded, that package
//! must be installed. The [`DependencyResolver`] turns the fragment's
//! `neededDependencies` into one install-parent command:
//!
//! - a version containing `:` is a locator (`file:`, `git+https:` ...) used as is;
//! - otherwise the argument is `name@version`, or `name` alone for an empty version.
//!
//! Package managers without a `--no-save` equivalent record the installed
//! packages in `package.json`. For those the manifest is copied aside before the
//! command and put back afterwards, whatever the outcome of the command.

use log::{debug, info, warn};
use std::path::Path;

use crate::descriptor::{MANIFEST_BACKUP_FILE, MANIFEST_FILE};
use crate::error::Result;
use crate::filesystem::FileStore;
use crate::packager::PackagerDescriptor;
use crate::runner::CommandRunner;

/// Installs `neededDependencies` through the install-parent command
pub struct DependencyResolver<'a> {
    runner: &'a dyn CommandRunner,
    store: &'a dyn FileStore,
    packager: &'a PackagerDescriptor,
    install_parent_args: &'a [String],
}

impl<'a> DependencyResolver<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        store: &'a dyn FileStore,
        packager: &'a PackagerDescriptor,
        install_parent_args: &'a [String],
    ) -> Self {
        Self {
            runner,
            store,
            packager,
            install_parent_args,
        }
    }

    /// Install `dependencies`, given as `(name, version-or-locator)` pairs.
    ///
    /// Nothing is run for an empty list.
    pub fn resolve(&self, dependencies: &[(String, String)]) -> Result<()> {
        info!("Resolving dependencies...");

        let args: Vec<String> = dependencies
            .iter()
            .map(|(name, version)| {
                debug!("Resolving name: {} version: {}", name, version);
                install_argument(name, version)
            })
            .collect();

        if args.is_empty() {
            info!("Nothing to resolve!");
            return Ok(());
        }

        let command = self
            .packager
            .install_parent_command(&args, self.install_parent_args);
        debug!("Resolving with command: {}", command);

        let manifest = Path::new(MANIFEST_FILE);
        if self.packager.prevent_manifest_change_from_parent_install() && self.store.exists(manifest)
        {
            let backup = Path::new(MANIFEST_BACKUP_FILE);
            debug!("Backup {} to {}", MANIFEST_FILE, MANIFEST_BACKUP_FILE);
            self.store.copy(manifest, backup)?;

            let outcome = self.runner.execute(&command);
            let restored = self.restore(manifest, backup);
            return match (outcome, restored) {
                (Err(command_err), Err(restore_err)) => {
                    warn!("Failed to restore {}: {}", MANIFEST_FILE, restore_err);
                    Err(command_err)
                }
                (Err(command_err), Ok(())) => Err(command_err),
                (Ok(()), restored) => restored,
            };
        }

        self.runner.execute(&command)
    }

    fn restore(&self, manifest: &Path, backup: &Path) -> Result<()> {
        self.store.delete(manifest)?;
        if self.store.exists(backup) {
            debug!("Restore {} from {}", MANIFEST_FILE, MANIFEST_BACKUP_FILE);
            self.store.copy(backup, manifest)?;
            self.store.delete(backup)?;
        }
        Ok(())
    }
}

/// Format one dependency for the install-parent command
pub fn install_argument(name: &str, version: &str) -> String {
    if version.contains(':') {
        version.to_string()
    } else if version.is_empty() {
        name.to_string()
    } else {
        format!("{}@{}", name, version)
    }
}
