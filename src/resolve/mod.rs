//! Vessel resolution: fill every vessel slot in a step list, insert the
//! transfers that make movement explicit, and clean up the artifacts.
//!
//! Resolution is total: it always produces an assignment for every slot.
//! The only failure modes are structural — a step type without a chain
//! template, or a forced directive pointing past the end of the list.

pub mod chain;
pub mod postprocess;
pub mod propagate;
pub mod template;
pub mod transfer;

use std::collections::HashSet;

use crate::error::ResolveError;
use crate::ir::Step;

pub use template::{MAX_FILTER_TEMP, Rule, STEP_VESSEL_CHAINS};

/// What a caller can force on a vessel slot ahead of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForcedDirective {
    /// Pin the slot to a specific vessel.
    Vessel(String),
    /// Resolve the slot to the destination of the nearest preceding
    /// separation.
    GroupTo,
    /// Resolve the slot to the opposite of its nearest neighbor, and
    /// suppress transfers around the step.
    Other,
    /// Resolve this step and everything before it separately from what
    /// follows. Used when material must route through a holding vessel
    /// instead of flowing straight to the next step.
    SplitWithNext,
    /// Resolve this step and everything after it separately from what
    /// precedes it.
    SplitWithPrev,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedVessel {
    /// Top-level index into the step list.
    pub step: usize,
    pub keyword: String,
    pub directive: ForcedDirective,
}

fn apply_forced(
    steps: &mut [Step],
    chains: &mut [chain::StepChain],
    forced: &[ForcedVessel],
    suppressed: &mut HashSet<usize>,
) -> Result<(), ResolveError> {
    for f in forced {
        if f.step >= steps.len() {
            return Err(ResolveError::ForcedVesselOutOfRange(f.step, steps.len()));
        }
        if matches!(
            f.directive,
            ForcedDirective::SplitWithNext | ForcedDirective::SplitWithPrev
        ) {
            // Splits are applied by segmentation, not per-link.
            continue;
        }
        let mut applied = false;
        for c in chains
            .iter_mut()
            .filter(|c| c.addr.map(|a| a.idx) == Some(f.step))
        {
            let Some(link) = c.links.iter_mut().find(|l| l.keyword == f.keyword) else {
                continue;
            };
            match &f.directive {
                ForcedDirective::Vessel(v) => link.assigned = Some(v.clone()),
                ForcedDirective::GroupTo => {
                    link.rules = template::GROUP_TO_ONLY;
                    link.assigned = None;
                }
                ForcedDirective::Other => {
                    link.rules = template::OTHER_ONLY;
                    link.assigned = None;
                    suppressed.insert(f.step);
                }
                ForcedDirective::SplitWithNext | ForcedDirective::SplitWithPrev => {}
            }
            applied = true;
            break;
        }
        // Slot keywords outside the chain ("through") write straight to
        // the step.
        if !applied {
            if let ForcedDirective::Vessel(v) = &f.directive {
                steps[f.step].set_vessel_slot(&f.keyword, Some(v.clone()));
            }
        }
    }
    Ok(())
}

/// Chain indices where a new resolution segment begins, from the split
/// directives. A `SplitWithNext` on a step cuts after its last link; a
/// `SplitWithPrev` cuts before its first.
fn segment_cuts(chains: &[chain::StepChain], forced: &[ForcedVessel]) -> Vec<usize> {
    let mut cuts: Vec<usize> = forced
        .iter()
        .filter_map(|f| match f.directive {
            ForcedDirective::SplitWithNext => chains
                .iter()
                .rposition(|c| c.addr.map(|a| a.idx) == Some(f.step))
                .map(|i| i + 1),
            ForcedDirective::SplitWithPrev => chains
                .iter()
                .position(|c| c.addr.map(|a| a.idx) == Some(f.step)),
            _ => None,
        })
        .collect();
    cuts.retain(|&c| c > 0 && c < chains.len());
    cuts.sort_unstable();
    cuts.dedup();
    cuts
}

/// Resolve all vessel slots in `steps`, inserting transfers as needed.
/// Already-assigned slots are treated as fixed, so re-resolving a resolved
/// list is a no-op.
pub fn resolve(steps: &mut Vec<Step>, forced: &[ForcedVessel]) -> Result<(), ResolveError> {
    let mut chains = chain::build_chain(steps)?;
    let mut suppressed = HashSet::new();
    apply_forced(steps, &mut chains, forced, &mut suppressed)?;
    let cuts = segment_cuts(&chains, forced);
    if cuts.is_empty() {
        propagate::propagate(&mut chains);
    } else {
        // Each segment resolves on its own, with its own sentinels; values
        // never propagate across a split.
        let mut remaining = chains;
        let mut resolved: Vec<chain::StepChain> = Vec::new();
        for cut in cuts.into_iter().rev() {
            let mut tail: Vec<_> = remaining.split_off(cut);
            propagate::propagate(&mut tail);
            resolved.splice(0..0, tail);
        }
        propagate::propagate(&mut remaining);
        resolved.splice(0..0, remaining);
        chains = resolved;
    }
    chain::write_back(steps, &chains);
    postprocess::postprocess_vessels(steps);
    transfer::insert_transfers(steps, &suppressed);
    postprocess::postprocess_transfers(steps);
    tracing::debug!(steps = steps.len(), "vessel resolution complete");
    Ok(())
}
