//! Built-in features, each activated by its command-line triggers

use log::{debug, warn};
use std::path::Path;

use crate::descriptor::MANIFEST_FILE;
use crate::logging::{level_for_flag, level_for_name, set_level};

use super::{ExecutionUnit, Feature, LifecyclePhase, UnitId};

/// Keep `package.json` after the run
pub const KEEP_MANIFEST_OPTION: &str = "--dry-keep-package-json";

/// Copy `package.json` to the given path after the run
pub const SAVE_MANIFEST_COPY_OPTION: &str = "--dry-save-package-json-to";

/// Cancels the deletion of `package.json`
pub fn keep_manifest() -> ExecutionUnit {
    ExecutionUnit::feature(
        UnitId::KeepManifest,
        LifecyclePhase::PreClean,
        Feature::new(&[KEEP_MANIFEST_OPTION]),
        |ctx, _| {
            debug!("Keeping {}", MANIFEST_FILE);
            ctx.deactivate(UnitId::DeleteManifest)
        },
    )
}

/// Copies `package.json` once the package manager is done with it.
///
/// Runs after the reconciliation so the copy reflects the command's edits.
pub fn save_manifest_copy() -> ExecutionUnit {
    ExecutionUnit::feature(
        UnitId::SaveManifestCopy,
        LifecyclePhase::PostExecute,
        Feature::new(&[SAVE_MANIFEST_COPY_OPTION]).needing_value(),
        |ctx, invocation| {
            let Some(target) = invocation.value.as_deref() else {
                return Ok(());
            };
            let manifest = Path::new(MANIFEST_FILE);
            if !ctx.store().exists(manifest) {
                warn!("No {} to copy to {}", MANIFEST_FILE, target);
                return Ok(());
            }
            debug!("Copying {} to {}", MANIFEST_FILE, target);
            ctx.store().copy(manifest, Path::new(target))
        },
    )
    .with_order(200)
}

/// Verbosity shortcuts, also understood by the package manager
pub fn enable_logging() -> ExecutionUnit {
    ExecutionUnit::feature(
        UnitId::EnableLogging,
        LifecyclePhase::Start,
        Feature::new(&["-s", "--silent", "-q", "--quiet", "-d", "--verbose", "-dd", "-ddd"])
            .forwardable(),
        |_, invocation| {
            if let Some(level) = invocation.trigger.as_deref().and_then(level_for_flag) {
                set_level(level);
                debug!("Log level set to {}", level);
            }
            Ok(())
        },
    )
    .with_order(50)
}

/// `--loglevel <level>` with npm level names
pub fn enable_logging_level() -> ExecutionUnit {
    ExecutionUnit::feature(
        UnitId::EnableLoggingLevel,
        LifecyclePhase::Start,
        Feature::new(&["--loglevel"]).needing_value().forwardable(),
        |_, invocation| {
            let value = invocation.value.as_deref().unwrap_or_default();
            match level_for_name(value) {
                Some(level) => {
                    set_level(level);
                    debug!("Log level set to {}", level);
                }
                None => warn!("Unknown log level '{}', keeping the current one", value),
            }
            Ok(())
        },
    )
    .with_order(50)
}
