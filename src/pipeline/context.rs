//! State shared by the units of one run

use std::rc::Rc;

use crate::config::CommandConfig;
use crate::dependency::DependencyResolver;
use crate::descriptor::{Fragment, ManifestDocument};
use crate::error::{Error, Result};
use crate::filesystem::FileStore;
use crate::runner::CommandRunner;

use super::{ExecutionUnit, UnitId};

/// Mutable state handed to each unit in turn.
///
/// The fragment and the manifest are filled in by the build steps; units that
/// need them before they exist fail with `Error::RequiredUnitMissing`.
pub struct Context {
    runner: Rc<dyn CommandRunner>,
    store: Rc<dyn FileStore>,
    config: CommandConfig,
    units: Vec<ExecutionUnit>,
    fragment: Option<Fragment>,
    fragment_found: bool,
    manifest: Option<ManifestDocument>,
}

impl Context {
    pub fn new(
        runner: Rc<dyn CommandRunner>,
        store: Rc<dyn FileStore>,
        config: CommandConfig,
        units: Vec<ExecutionUnit>,
    ) -> Self {
        Self {
            runner,
            store,
            config,
            units,
            fragment: None,
            fragment_found: false,
            manifest: None,
        }
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn store(&self) -> &dyn FileStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// A resolver for `neededDependencies` bound to this run's packager
    pub fn dependency_resolver(&self) -> DependencyResolver<'_> {
        DependencyResolver::new(
            self.runner(),
            self.store(),
            self.config.packager(),
            self.config.install_parent_args(),
        )
    }

    pub fn units(&self) -> &[ExecutionUnit] {
        &self.units
    }

    /// Append a unit; it takes part in the next [`super::run`]
    pub fn register(&mut self, unit: ExecutionUnit) {
        self.units.push(unit);
    }

    pub fn unit(&self, id: UnitId) -> Option<&ExecutionUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Look up a unit to act upon
    ///
    /// # Errors
    ///
    /// `Error::RequiredUnitMissing` when no unit has this id.
    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut ExecutionUnit> {
        self.units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::RequiredUnitMissing {
                unit: id.to_string(),
            })
    }

    /// Switch a unit off so the engine skips it
    pub fn deactivate(&mut self, id: UnitId) -> Result<()> {
        self.unit_mut(id)?.active = false;
        Ok(())
    }

    pub fn set_fragment(&mut self, fragment: Fragment, found: bool) {
        self.fragment = Some(fragment);
        self.fragment_found = found;
    }

    pub fn fragment(&self) -> Result<&Fragment> {
        self.fragment
            .as_ref()
            .ok_or_else(|| missing_output(UnitId::BuildFragment))
    }

    /// Whether the root fragment was read from storage rather than defaulted
    pub fn fragment_found(&self) -> bool {
        self.fragment_found
    }

    pub fn set_manifest(&mut self, manifest: ManifestDocument) {
        self.manifest = Some(manifest);
    }

    pub fn manifest(&self) -> Result<&ManifestDocument> {
        self.manifest
            .as_ref()
            .ok_or_else(|| missing_output(UnitId::BuildManifest))
    }
}

fn missing_output(producer: UnitId) -> Error {
    Error::RequiredUnitMissing {
        unit: producer.to_string(),
    }
}
