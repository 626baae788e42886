//! # Execution Pipeline
//!
//! Every `dry` invocation runs as one ordered list of [`ExecutionUnit`]s.
//!
//! - **Steps** form the fixed lifecycle: read the fragment, build and write the
//!   manifest, run the package manager, fold its edits back, clean up.
//! - **Features** are inactive until one of their trigger flags appears on the
//!   command line. An active feature may switch other units off before they
//!   run, the way `--dry-keep-package-json` cancels the manifest deletion.
//!
//! Units are ordered by [`LifecyclePhase`] and then by their `order` within the
//! phase (lower first, registration order on ties). They run one at a time over
//! a shared mutable [`Context`]; the first failure stops the run.
//!
//! ## Modules
//!
//! - [`context`]: the state shared by all units
//! - [`engine`]: trigger pre-pass, ordering and execution
//! - [`steps`]: the built-in lifecycle steps
//! - [`features`]: the built-in flag-activated features

pub mod context;
pub mod engine;
pub mod features;
pub mod steps;

pub use context::Context;
pub use engine::{activate_features, execution_plan, run, PreparedArguments};

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::config::CommandConfig;
use crate::error::Result;
use crate::filesystem::DiskStore;
use crate::runner::SystemRunner;

/// Default position of a unit inside its phase
pub const DEFAULT_ORDER: u32 = 100;

/// Stages of a `dry` run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecyclePhase {
    Start,
    PreBuildFragment,
    BuildFragment,
    PostBuildFragment,
    PreBuildManifest,
    BuildManifest,
    PostBuildManifest,
    PreExecute,
    Execute,
    PostExecute,
    PreClean,
    Clean,
    PostClean,
    Finish,
}

impl LifecyclePhase {
    /// Numeric rank used for ordering
    pub fn rank(self) -> u64 {
        match self {
            LifecyclePhase::Start => 0,
            LifecyclePhase::PreBuildFragment => 1000,
            LifecyclePhase::BuildFragment => 2000,
            LifecyclePhase::PostBuildFragment => 3000,
            LifecyclePhase::PreBuildManifest => 4000,
            LifecyclePhase::BuildManifest => 5000,
            LifecyclePhase::PostBuildManifest => 6000,
            LifecyclePhase::PreExecute => 7000,
            LifecyclePhase::Execute => 8000,
            LifecyclePhase::PostExecute => 9000,
            LifecyclePhase::PreClean => 10000,
            LifecyclePhase::Clean => 11000,
            LifecyclePhase::PostClean => 12000,
            LifecyclePhase::Finish => u64::MAX,
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identity of a unit in the [`Context`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitId {
    Start,
    BuildFragment,
    BuildManifest,
    SaveManifest,
    ExecuteCommand,
    ReconcileManifest,
    DeleteManifest,
    Finish,
    KeepManifest,
    SaveManifestCopy,
    EnableLogging,
    EnableLoggingLevel,
    /// Units registered outside the built-in set
    Custom(&'static str),
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::Custom(name) => f.write_str(name),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// Activation record of a feature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feature {
    /// Flags activating the feature, matched exactly
    pub triggers: Vec<String>,
    /// Whether the trigger is followed by a value
    pub needs_value: bool,
    /// Whether the trigger is also handed to the package manager
    pub forwardable: bool,
    /// The trigger found on the command line
    pub active_trigger: Option<String>,
    /// The value following the trigger
    pub captured_value: Option<String>,
}

impl Feature {
    pub fn new(triggers: &[&str]) -> Self {
        Self {
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn needing_value(mut self) -> Self {
        self.needs_value = true;
        self
    }

    pub fn forwardable(mut self) -> Self {
        self.forwardable = true;
        self
    }

    pub fn is_triggered_by(&self, token: &str) -> bool {
        self.triggers.iter().any(|t| t == token)
    }
}

#[derive(Debug, Clone)]
pub enum UnitKind {
    Step,
    Feature(Feature),
}

/// What a unit is called with: the trigger and value that activated it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub trigger: Option<String>,
    pub value: Option<String>,
}

/// Behavior of a unit
pub type Action = Rc<dyn Fn(&mut Context, &Invocation) -> Result<()>>;

/// One step or feature of the pipeline
#[derive(Clone)]
pub struct ExecutionUnit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub phase: LifecyclePhase,
    pub order: u32,
    pub active: bool,
    pub action: Action,
}

impl ExecutionUnit {
    /// An active step
    pub fn step<F>(id: UnitId, phase: LifecyclePhase, action: F) -> Self
    where
        F: Fn(&mut Context, &Invocation) -> Result<()> + 'static,
    {
        Self {
            id,
            kind: UnitKind::Step,
            phase,
            order: DEFAULT_ORDER,
            active: true,
            action: Rc::new(action),
        }
    }

    /// An inactive feature, waiting for one of its triggers
    pub fn feature<F>(id: UnitId, phase: LifecyclePhase, feature: Feature, action: F) -> Self
    where
        F: Fn(&mut Context, &Invocation) -> Result<()> + 'static,
    {
        Self {
            id,
            kind: UnitKind::Feature(feature),
            phase,
            order: DEFAULT_ORDER,
            active: false,
            action: Rc::new(action),
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn is_step(&self) -> bool {
        matches!(self.kind, UnitKind::Step)
    }

    pub fn feature_record(&self) -> Option<&Feature> {
        match &self.kind {
            UnitKind::Feature(feature) => Some(feature),
            UnitKind::Step => None,
        }
    }

    pub fn feature_record_mut(&mut self) -> Option<&mut Feature> {
        match &mut self.kind {
            UnitKind::Feature(feature) => Some(feature),
            UnitKind::Step => None,
        }
    }

    pub fn invocation(&self) -> Invocation {
        match &self.kind {
            UnitKind::Feature(feature) => Invocation {
                trigger: feature.active_trigger.clone(),
                value: feature.captured_value.clone(),
            },
            UnitKind::Step => Invocation::default(),
        }
    }
}

impl fmt::Debug for ExecutionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionUnit")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("phase", &self.phase)
            .field("order", &self.order)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Run `dry` with the tokens of its command line, in `working_dir`.
///
/// `env_packager` is the packager selected through the environment, if any.
pub fn execute(
    raw_args: Vec<String>,
    working_dir: &Path,
    env_packager: Option<String>,
) -> Result<()> {
    let mut units = default_units();
    let config = CommandConfig::from_args(raw_args, working_dir, env_packager, &mut units)?;
    let mut ctx = Context::new(
        Rc::new(SystemRunner::new(working_dir)),
        Rc::new(DiskStore::new(working_dir)),
        config,
        units,
    );
    run(&mut ctx)
}

/// The built-in steps and features, in registration order
pub fn default_units() -> Vec<ExecutionUnit> {
    vec![
        steps::start(),
        steps::build_fragment(),
        steps::build_manifest(),
        steps::save_manifest(),
        steps::execute_command(),
        steps::reconcile_manifest(),
        steps::delete_manifest(),
        steps::finish(),
        features::keep_manifest(),
        features::save_manifest_copy(),
        features::enable_logging(),
        features::enable_logging_level(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ranks_follow_declaration_order() {
        let phases = [
            LifecyclePhase::Start,
            LifecyclePhase::PreBuildFragment,
            LifecyclePhase::BuildFragment,
            LifecyclePhase::PostBuildFragment,
            LifecyclePhase::PreBuildManifest,
            LifecyclePhase::BuildManifest,
            LifecyclePhase::PostBuildManifest,
            LifecyclePhase::PreExecute,
            LifecyclePhase::Execute,
            LifecyclePhase::PostExecute,
            LifecyclePhase::PreClean,
            LifecyclePhase::Clean,
            LifecyclePhase::PostClean,
            LifecyclePhase::Finish,
        ];
        for pair in phases.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(LifecyclePhase::Finish.rank(), u64::MAX);
    }

    #[test]
    fn test_default_units_have_unique_ids() {
        let units = default_units();
        for (i, unit) in units.iter().enumerate() {
            assert!(units[i + 1..].iter().all(|other| other.id != unit.id));
        }
        assert_eq!(units.iter().filter(|u| u.is_step()).count(), 8);
        assert!(units.iter().filter(|u| !u.is_step()).all(|u| !u.active));
    }

    #[test]
    fn test_feature_trigger_match_is_exact() {
        let feature = Feature::new(&["--dry-keep-package-json"]);
        assert!(feature.is_triggered_by("--dry-keep-package-json"));
        assert!(!feature.is_triggered_by("--DRY-KEEP-PACKAGE-JSON"));
        assert!(!feature.is_triggered_by("--dry-keep"));
    }

    #[test]
    fn test_step_invocation_is_empty() {
        let unit = ExecutionUnit::step(UnitId::Custom("noop"), LifecyclePhase::Start, |_, _| Ok(()));
        assert_eq!(unit.invocation(), Invocation::default());
        assert_eq!(unit.order, DEFAULT_ORDER);
        assert_eq!(unit.id.to_string(), "noop");
    }
}
