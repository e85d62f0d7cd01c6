//! Transfer insertion: make material movement explicit wherever two
//! adjacent steps disagree about where the mixture is.

use std::collections::HashSet;

use crate::convert::transfer;
use crate::ir::Step;

/// Vessel the mixture ends up in after this step.
fn exit_vessel(step: &Step) -> Option<String> {
    match step {
        Step::Repeat(rep) => rep.children.iter().rev().find_map(exit_vessel),
        _ => step
            .vessel_keywords()
            .last()
            .and_then(|k| step.vessel_slot(k))
            .cloned()
            .flatten(),
    }
}

/// Vessel this step expects the mixture in when it starts.
fn entry_vessel(step: &Step) -> Option<String> {
    match step {
        Step::Repeat(rep) => rep.children.iter().find_map(entry_vessel),
        _ => step
            .vessel_keywords()
            .first()
            .and_then(|k| step.vessel_slot(k))
            .cloned()
            .flatten(),
    }
}

/// Insert transfers between adjacent slotted steps whose vessels differ.
/// Steps in `suppressed` were routed elsewhere on purpose and never get a
/// transfer on either side.
pub fn insert_transfers(steps: &mut Vec<Step>, suppressed: &HashSet<usize>) {
    let mut insertions: Vec<(usize, Step)> = Vec::new();
    let mut prev: Option<(usize, String)> = None;
    for (i, step) in steps.iter().enumerate() {
        let entry = entry_vessel(step);
        if let (Some((pi, from)), Some(to)) = (&prev, &entry) {
            // Loading from the buffer flask is plumbing internal to a
            // separation run; the parking move already happened.
            let buffered = to == "buffer_flask1";
            if from != to && !buffered && !suppressed.contains(pi) && !suppressed.contains(&i) {
                insertions.push((i, transfer(from.clone(), to.clone())));
            }
        }
        if let Some(exit) = exit_vessel(step) {
            prev = Some((i, exit));
        }
    }
    for (at, t) in insertions.into_iter().rev() {
        tracing::debug!(at, "inserting transfer");
        steps.insert(at, t);
    }
}
