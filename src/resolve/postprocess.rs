//! Post-resolution edits: small, targeted rewrites that clean up artifacts
//! of purely local resolution.

use crate::ir::{Step, TransferStep};

use super::template::{Rule, STEP_VESSEL_CHAINS};

fn is_separate(step: &Step) -> bool {
    matches!(step, Step::Separate(_))
}

/// Vessel edits that run before transfer insertion.
pub fn postprocess_vessels(steps: &mut [Step]) {
    // A solvent-less separation directly after another separation works the
    // phase still sitting in the separator.
    for i in 1..steps.len() {
        if !is_separate(&steps[i - 1]) {
            continue;
        }
        if let Step::Separate(sep) = &mut steps[i] {
            if sep.solvent.is_none() {
                sep.from_vessel = Some("separator".to_string());
            }
        }
    }

    // A separation whose predecessor parked its discarded phase in the
    // buffer flask works that parked phase, not the separator contents.
    for i in 1..steps.len() {
        let buffered = matches!(
            &steps[i - 1],
            Step::Separate(s) if s.waste_vessel.as_deref() == Some("buffer_flask1")
        );
        if !buffered {
            continue;
        }
        if let Step::Separate(sep) = &mut steps[i] {
            sep.from_vessel = Some("buffer_flask1".to_string());
        }
    }

    // Adjacent separations routed through the buffer flask collapse onto
    // the separator: the mixture never actually needs to leave it.
    for i in 1..steps.len() {
        let collapse = matches!(
            (&steps[i - 1], &steps[i]),
            (Step::Separate(a), Step::Separate(b))
                if a.to_vessel.as_deref() == Some("buffer_flask1")
                    && b.from_vessel.as_deref() == Some("buffer_flask1")
        );
        if collapse {
            if let Step::Separate(a) = &mut steps[i - 1] {
                a.to_vessel = Some("separator".to_string());
            }
            if let Step::Separate(b) = &mut steps[i] {
                b.from_vessel = Some("separator".to_string());
            }
        }
    }
}

fn anchored(step: &Step) -> bool {
    match step {
        Step::Repeat(rep) => rep.children.iter().any(anchored),
        _ => STEP_VESSEL_CHAINS
            .get(step.name())
            .is_some_and(|slots| {
                slots
                    .iter()
                    .any(|s| s.rules.iter().any(|r| matches!(r, Rule::Definite(_))))
            }),
    }
}

fn retarget(step: &mut Step, from: &str, to: &str) {
    match step {
        Step::Repeat(rep) => {
            for child in &mut rep.children {
                retarget(child, from, to);
            }
        }
        _ => {
            for k in step.vessel_keywords() {
                if step.vessel_slot(k).and_then(|v| v.as_deref()) == Some(from) {
                    step.set_vessel_slot(k, Some(to.to_string()));
                }
            }
        }
    }
}

/// Transfer edits that run after insertion.
pub fn postprocess_transfers(steps: &mut Vec<Step>) {
    // Steps before the first transfer that have no hardware anchor may as
    // well start in the transfer's destination; the initial movement was an
    // artifact of resolving them against a sentinel.
    if let Some(t) = steps.iter().position(|s| matches!(s, Step::Transfer(_))) {
        let leading_unanchored = t > 0 && steps[..t].iter().all(|s| !anchored(s));
        if leading_unanchored {
            let Step::Transfer(TransferStep {
                from_vessel: Some(from),
                to_vessel: Some(to),
                ..
            }) = steps[t].clone()
            else {
                return;
            };
            let all_in_from = steps[..t].iter().all(|s| {
                s.vessel_keywords()
                    .iter()
                    .all(|k| s.vessel_slot(k).and_then(|v| v.as_deref()) == Some(from.as_str()))
            });
            let temp_ok = steps[..t]
                .iter()
                .all(|s| super::propagate::compatible(s.temp_requirement(), &to));
            if all_in_from && temp_ok {
                tracing::debug!(%from, %to, "retargeting leading steps past transfer");
                for s in &mut steps[..t] {
                    retarget(s, &from, &to);
                }
                steps.remove(t);
            }
        }
    }

    // Transfers that go nowhere carry no information.
    steps.retain(|s| {
        !matches!(
            s,
            Step::Transfer(TransferStep { from_vessel, to_vessel, .. })
                if from_vessel == to_vessel
        )
    });
}
