//! Built-in lifecycle steps
//!
//! | Step              | Phase          |
//! |-------------------|----------------|
//! | Start             | Start          |
//! | BuildFragment     | BuildFragment  |
//! | BuildManifest     | BuildManifest  |
//! | SaveManifest      | PreExecute     |
//! | ExecuteCommand    | Execute        |
//! | ReconcileManifest | PostExecute    |
//! | DeleteManifest    | Clean          |
//! | Finish            | Finish         |

use log::{debug, info, LevelFilter};
use std::path::Path;

use crate::descriptor::{FRAGMENT_FILE, MANIFEST_FILE};
use crate::inheritance::{load_root, InheritanceResolver, StoreFragmentLoader};
use crate::output::{status_line, OutputConfig};
use crate::reconcile::{read_manifest, reconcile};

use super::{ExecutionUnit, LifecyclePhase, UnitId};

pub fn start() -> ExecutionUnit {
    ExecutionUnit::step(UnitId::Start, LifecyclePhase::Start, |ctx, _| {
        info!(
            "Dry lifecycle started for {} in {}",
            ctx.config().packager().package_manager(),
            ctx.config().working_dir().display()
        );
        Ok(())
    })
}

/// Read `package-dry.json`; an absent file yields an empty fragment
pub fn build_fragment() -> ExecutionUnit {
    ExecutionUnit::step(UnitId::BuildFragment, LifecyclePhase::BuildFragment, |ctx, _| {
        let location = Path::new(FRAGMENT_FILE);
        let found = ctx.store().exists(location);
        let fragment = {
            let loader = StoreFragmentLoader::new(ctx.store());
            load_root(&loader, location)?
        };
        if !found {
            debug!("No {} found, starting from an empty descriptor", FRAGMENT_FILE);
        }
        ctx.set_fragment(fragment, found);
        Ok(())
    })
}

/// Resolve the inheritance chain into the manifest
pub fn build_manifest() -> ExecutionUnit {
    ExecutionUnit::step(UnitId::BuildManifest, LifecyclePhase::BuildManifest, |ctx, _| {
        let manifest = {
            let loader = StoreFragmentLoader::new(ctx.store());
            let resolver = InheritanceResolver::new(&loader, ctx.dependency_resolver());
            resolver.resolve(ctx.fragment()?)?
        };
        ctx.set_manifest(manifest);
        Ok(())
    })
}

/// Write `package.json`, unless the project has no fragment yet
pub fn save_manifest() -> ExecutionUnit {
    ExecutionUnit::step(UnitId::SaveManifest, LifecyclePhase::PreExecute, |ctx, _| {
        if !ctx.fragment_found() {
            debug!("No {}, {} left untouched", FRAGMENT_FILE, MANIFEST_FILE);
            return Ok(());
        }
        let content = ctx.manifest()?.to_pretty_string()?;
        debug!("Writing {}", MANIFEST_FILE);
        ctx.store().write(Path::new(MANIFEST_FILE), &content)
    })
}

/// Run the package manager with the translated arguments
pub fn execute_command() -> ExecutionUnit {
    ExecutionUnit::step(UnitId::ExecuteCommand, LifecyclePhase::Execute, |ctx, _| {
        match ctx.config().proxy_command() {
            Some(command) => {
                info!("Executing {}", command);
                ctx.runner().execute(&command)
            }
            None => {
                info!("No command to execute");
                Ok(())
            }
        }
    })
}

/// Fold the package manager's manifest edits back into the fragment
pub fn reconcile_manifest() -> ExecutionUnit {
    ExecutionUnit::step(
        UnitId::ReconcileManifest,
        LifecyclePhase::PostExecute,
        |ctx, _| {
            let mutated = read_manifest(ctx.store(), Path::new(MANIFEST_FILE))?;
            let original = ctx.manifest()?.clone();
            let mut fragment = ctx.fragment()?.clone();

            let changes = reconcile(&original, &mutated, &mut fragment, ctx.store())?;
            if !changes.is_empty() {
                ctx.set_fragment(fragment, true);
            }
            Ok(())
        },
    )
}

/// Remove `package.json`; nothing to remove is fine
pub fn delete_manifest() -> ExecutionUnit {
    ExecutionUnit::step(UnitId::DeleteManifest, LifecyclePhase::Clean, |ctx, _| {
        if ctx.store().delete(Path::new(MANIFEST_FILE))? {
            debug!("Deleted {}", MANIFEST_FILE);
        }
        Ok(())
    })
}

pub fn finish() -> ExecutionUnit {
    ExecutionUnit::step(UnitId::Finish, LifecyclePhase::Finish, |ctx, _| {
        info!("All steps executed successfully");
        if log::max_level() >= LevelFilter::Warn {
            let output = OutputConfig::from_env();
            eprintln!(
                "{}",
                status_line(&output, ctx.config().proxy_command().as_deref())
            );
        }
        Ok(())
    })
}
