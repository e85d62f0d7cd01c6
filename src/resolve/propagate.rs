//! Chained constraint propagation over the vessel links.
//!
//! The order of operations is load-bearing: definite hardware first, then
//! iterated directional passes, then reactor sentinels at both ends and the
//! same passes again, then the reverse-sweep fallback for circular
//! dependencies, and finally the group-to and opposite-neighbor mop-ups.
//!
//! The reverse sweep is knowingly imperfect: it carries the last vessel
//! seen from the right across any links the directional rules could not
//! decide, which can pick a vessel an exact solver would not. Procedures
//! that reach it are circular in their vessel references; a deterministic
//! approximation beats a refusal here.

use super::chain::{StepChain, sentinel};
use super::template::{MAX_FILTER_TEMP, Rule};

pub(super) fn compatible(temp: Option<f64>, vessel: &str) -> bool {
    match temp {
        Some(t) => vessel != "filter" || t <= MAX_FILTER_TEMP,
        None => true,
    }
}

/// Boundary slot of the nearest preceding slotted step, if assigned.
fn prev_vessel(chains: &[StepChain], ci: usize) -> Option<String> {
    chains[..ci]
        .iter()
        .rev()
        .find(|c| c.has_links())
        .and_then(|c| c.last_assigned().map(String::from))
}

fn next_vessel(chains: &[StepChain], ci: usize) -> Option<String> {
    chains[ci + 1..]
        .iter()
        .find(|c| c.has_links())
        .and_then(|c| c.first_assigned().map(String::from))
}

/// Nearest assigned neighbor whose vessel tolerates `temp`. Forward first,
/// skipping incompatible hardware but stopping at a still-unassigned
/// boundary, then backward.
fn heatcool_vessel(chains: &[StepChain], ci: usize, temp: Option<f64>) -> Option<String> {
    for c in chains[ci + 1..].iter().filter(|c| c.has_links()) {
        match c.first_assigned() {
            Some(v) if compatible(temp, v) => return Some(v.to_string()),
            Some(_) => continue,
            None => break,
        }
    }
    for c in chains[..ci].iter().rev().filter(|c| c.has_links()) {
        match c.last_assigned() {
            Some(v) if compatible(temp, v) => return Some(v.to_string()),
            Some(_) => continue,
            None => break,
        }
    }
    None
}

/// Destination of the nearest preceding separation.
fn group_to_vessel(chains: &[StepChain], ci: usize) -> Option<String> {
    chains[..ci].iter().rev().find_map(|c| {
        if c.name != "Separate" {
            return None;
        }
        c.links
            .iter()
            .find(|l| l.keyword == "to_vessel")
            .and_then(|l| l.assigned.clone())
    })
}

/// The opposite of the nearest assigned neighbor: material deliberately
/// routed away from where it would naturally sit.
fn other_vessel(chains: &[StepChain], ci: usize) -> String {
    let neighbor = prev_vessel(chains, ci).or_else(|| next_vessel(chains, ci));
    match neighbor.as_deref() {
        Some("reactor") => "filter".to_string(),
        _ => "reactor".to_string(),
    }
}

fn definite_pass(chains: &mut [StepChain]) {
    for chain in chains.iter_mut() {
        for link in &mut chain.links {
            if link.assigned.is_some() {
                continue;
            }
            if let Some(Rule::Definite(v)) =
                link.rules.iter().find(|r| matches!(r, Rule::Definite(_)))
            {
                link.assigned = Some((*v).to_string());
            }
        }
    }
}

/// One directional pass: every unresolved link tries its rules in order
/// against the current assignments. Assignments made earlier in the same
/// pass are visible to later links, so values flow left to right within a
/// pass and right to left across passes.
fn directional_pass(chains: &mut Vec<StepChain>) {
    for ci in 0..chains.len() {
        for li in 0..chains[ci].links.len() {
            if chains[ci].links[li].assigned.is_some() {
                continue;
            }
            let temp = chains[ci].temp;
            let mut value = None;
            for rule in chains[ci].links[li].rules {
                value = match rule {
                    Rule::Definite(v) => Some((*v).to_string()),
                    Rule::Prev => prev_vessel(chains, ci),
                    Rule::Next => next_vessel(chains, ci),
                    Rule::HeatCool => heatcool_vessel(chains, ci, temp),
                    Rule::GroupTo | Rule::Other => None,
                };
                if value.is_some() {
                    break;
                }
            }
            chains[ci].links[li].assigned = value;
        }
    }
}

fn longest_unresolved_run(chains: &[StepChain]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in chains {
        if c.unresolved() {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

fn has_unresolved(chains: &[StepChain]) -> bool {
    chains.iter().any(StepChain::unresolved)
}

/// The circular-dependency fallback: sweep right to left carrying the last
/// assigned vessel seen, filling any link the directional rules left open.
/// Links whose rules are all mop-up rules are skipped so the group-to and
/// opposite-neighbor passes below still decide them.
fn reverse_sweep(chains: &mut [StepChain]) {
    let mut carry: Option<String> = None;
    for chain in chains.iter_mut().rev() {
        for link in chain.links.iter_mut().rev() {
            let mop_up_only = link
                .rules
                .iter()
                .all(|r| matches!(r, Rule::GroupTo | Rule::Other));
            match &link.assigned {
                Some(v) => carry = Some(v.clone()),
                None if !mop_up_only => link.assigned = carry.clone(),
                None => {}
            }
        }
    }
}

fn group_to_pass(chains: &mut Vec<StepChain>) {
    for ci in 0..chains.len() {
        for li in 0..chains[ci].links.len() {
            let link = &chains[ci].links[li];
            if link.assigned.is_some() || !link.rules.contains(&Rule::GroupTo) {
                continue;
            }
            // Without a preceding separation there is no group destination;
            // fall back to the reactor so the slot is still assigned.
            let value = group_to_vessel(chains, ci)
                .unwrap_or_else(|| "reactor".to_string());
            chains[ci].links[li].assigned = Some(value);
        }
    }
}

fn other_pass(chains: &mut Vec<StepChain>) {
    for ci in 0..chains.len() {
        for li in 0..chains[ci].links.len() {
            let link = &chains[ci].links[li];
            if link.assigned.is_some() || !link.rules.contains(&Rule::Other) {
                continue;
            }
            let value = other_vessel(chains, ci);
            chains[ci].links[li].assigned = Some(value);
        }
    }
}

/// Run full propagation over the chain. Every link is assigned afterwards.
pub fn propagate(chains: &mut Vec<StepChain>) {
    definite_pass(chains);
    let passes = longest_unresolved_run(chains).max(1);
    for _ in 0..passes {
        directional_pass(chains);
    }
    if has_unresolved(chains) {
        // Material starts and ends in the reactor; the sentinels make that
        // explicit so the boundary links have neighbors.
        chains.insert(0, sentinel());
        chains.push(sentinel());
        let passes = longest_unresolved_run(chains).max(1);
        for _ in 0..passes {
            directional_pass(chains);
        }
        if has_unresolved(chains) {
            tracing::debug!("circular vessel references, applying reverse sweep");
            reverse_sweep(chains);
        }
    }
    group_to_pass(chains);
    other_pass(chains);
    // Strip sentinels before write-back.
    chains.retain(|c| c.addr.is_some());
}

#[cfg(test)]
mod tests {
    use super::super::chain::build_chain;
    use super::super::template::OTHER_ONLY;
    use super::*;
    use crate::ir::{AddStep, FilterStep, HeatChillStep, SeparateStep, SeparationPurpose, Step};

    fn add() -> Step {
        Step::Add(AddStep {
            reagent: "water".into(),
            vessel: None,
            volume: None,
            mass: None,
            amount: None,
            temp: None,
            time: None,
            dropwise: false,
            stir: false,
            through: None,
            atmosphere: None,
        })
    }

    fn separate() -> Step {
        Step::Separate(SeparateStep {
            purpose: SeparationPurpose::Wash,
            solvent: Some("water".into()),
            solvent_volume: None,
            repeats: 1,
            from_vessel: None,
            separation_vessel: None,
            to_vessel: None,
            waste_vessel: Some("waste".into()),
        })
    }

    #[test]
    fn sentinels_are_stripped_after_propagation() {
        let steps = vec![add()];
        let mut chains = build_chain(&steps).unwrap();
        propagate(&mut chains);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].links[0].assigned.as_deref(), Some("reactor"));
    }

    #[test]
    fn reverse_sweep_carries_from_the_right() {
        // The separation's destination waits on its neighbor, which an
        // opposite-neighbor directive keeps undecided until the mop-up:
        // a circular reference only the sweep can break.
        let steps = vec![separate(), add()];
        let mut chains = build_chain(&steps).unwrap();
        chains[1].links[0].rules = OTHER_ONLY;
        propagate(&mut chains);
        assert_eq!(chains[0].links[2].assigned.as_deref(), Some("reactor"));
        assert_eq!(chains[1].links[0].assigned.as_deref(), Some("filter"));
    }

    #[test]
    fn hot_step_skips_incompatible_hardware() {
        let steps = vec![
            Step::HeatChill(HeatChillStep {
                vessel: None,
                temp: Some(100.0),
                time: None,
                active: true,
                stir: false,
                atmosphere: None,
            }),
            Step::Filter(FilterStep { filter_vessel: None, time: None }),
        ];
        let mut chains = build_chain(&steps).unwrap();
        propagate(&mut chains);
        assert_eq!(chains[0].links[0].assigned.as_deref(), Some("reactor"));
        assert_eq!(chains[1].links[0].assigned.as_deref(), Some("filter"));
    }
}
