//! Feature activation, ordering and execution of the units

use log::{debug, info};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::arguments::ArgumentTranslator;
use crate::error::{Error, Result};

use super::{Context, ExecutionUnit};

/// Command-line tokens once `dry` features have been picked out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedArguments {
    /// Arguments of the main package manager command
    pub proxy_args: Vec<String>,
    /// Arguments appended to the install-parent command
    pub install_parent_args: Vec<String>,
}

/// Scan `tokens` for feature triggers and translate the rest.
///
/// A token matching a feature trigger activates that feature and, when the
/// feature needs a value, consumes the following token. Non-forwardable
/// triggers stop there; everything else goes through `translator`.
///
/// # Errors
///
/// `MissingArgumentValue` when a value-taking trigger is the last token, and
/// any error raised by the translator.
pub fn activate_features(
    units: &mut [ExecutionUnit],
    translator: &ArgumentTranslator,
    tokens: Vec<String>,
) -> Result<PreparedArguments> {
    let mut remaining: VecDeque<String> = tokens.into();
    let mut prepared = PreparedArguments::default();

    while let Some(token) = remaining.pop_front() {
        let triggered = units.iter_mut().find_map(|unit| {
            let matches = unit
                .feature_record()
                .is_some_and(|feature| feature.is_triggered_by(&token));
            matches.then_some((unit.id, unit))
        });

        let Some((id, unit)) = triggered else {
            translator.map_arguments(
                &token,
                None,
                &mut remaining,
                &mut prepared.proxy_args,
                &mut prepared.install_parent_args,
            )?;
            continue;
        };

        unit.active = true;
        let Some(feature) = unit.feature_record_mut() else {
            continue;
        };
        let value = if feature.needs_value {
            Some(
                remaining
                    .pop_front()
                    .ok_or_else(|| Error::MissingArgumentValue {
                        argument: token.clone(),
                    })?,
            )
        } else {
            None
        };
        debug!("Feature {} activated by {}", id, token);
        feature.active_trigger = Some(token.clone());
        feature.captured_value = value.clone();

        if feature.forwardable {
            translator.map_arguments(
                &token,
                value,
                &mut remaining,
                &mut prepared.proxy_args,
                &mut prepared.install_parent_args,
            )?;
        }
    }

    Ok(prepared)
}

/// Indices of the units to consider, in execution order.
///
/// Steps are always part of the plan, features only when active. Units are
/// sorted by phase then by order; ties keep registration order.
pub fn execution_plan(units: &[ExecutionUnit]) -> Vec<usize> {
    let mut plan: Vec<usize> = (0..units.len())
        .filter(|&i| units[i].is_step() || units[i].active)
        .collect();
    plan.sort_by_key(|&i| (units[i].phase.rank(), units[i].order));
    plan
}

/// Run the planned units one after the other.
///
/// A unit switched off by an earlier unit is skipped. The first error stops
/// the run and is returned.
pub fn run(ctx: &mut Context) -> Result<()> {
    let plan = execution_plan(ctx.units());

    for index in plan {
        let unit = &ctx.units()[index];
        if !unit.active {
            info!("Skipping {} ({} / {})", unit.id, unit.phase, unit.order);
            continue;
        }
        info!("Running {} ({} / {})", unit.id, unit.phase, unit.order);

        let action = Rc::clone(&unit.action);
        let invocation = unit.invocation();
        action(ctx, &invocation)?;
    }

    Ok(())
}
