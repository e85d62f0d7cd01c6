//! The constraint chain: one entry per step (repeat children inlined), each
//! carrying its vessel links, built from the templates and pre-seeded with
//! whatever slots already hold. Propagation mutates the chain only; the
//! steps themselves are written back at the end.

use crate::error::ResolveError;
use crate::ir::Step;

use super::template::{Rule, STEP_VESSEL_CHAINS};

/// Address of a step in the (possibly nested) step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepAddr {
    pub idx: usize,
    pub child: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ChainLink {
    pub keyword: &'static str,
    pub rules: &'static [Rule],
    pub assigned: Option<String>,
}

/// One step's entry in the chain. `addr` is `None` for the reactor
/// sentinels appended during propagation.
#[derive(Debug, Clone)]
pub struct StepChain {
    pub addr: Option<StepAddr>,
    pub name: &'static str,
    pub temp: Option<f64>,
    pub links: Vec<ChainLink>,
}

impl StepChain {
    pub fn first_assigned(&self) -> Option<&str> {
        self.links.first().and_then(|l| l.assigned.as_deref())
    }

    pub fn last_assigned(&self) -> Option<&str> {
        self.links.last().and_then(|l| l.assigned.as_deref())
    }

    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }

    pub fn unresolved(&self) -> bool {
        self.links.iter().any(|l| l.assigned.is_none())
    }
}

pub fn sentinel() -> StepChain {
    StepChain {
        addr: None,
        name: "Reactor",
        temp: None,
        links: vec![ChainLink {
            keyword: "vessel",
            rules: &[],
            assigned: Some("reactor".to_string()),
        }],
    }
}

fn chain_for(step: &Step, addr: StepAddr) -> Result<StepChain, ResolveError> {
    let slots = STEP_VESSEL_CHAINS
        .get(step.name())
        .ok_or_else(|| ResolveError::UnknownStepType(step.name().to_string()))?;
    let links = slots
        .iter()
        .map(|s| ChainLink {
            keyword: s.keyword,
            rules: s.rules,
            // Pre-seeded slots stay fixed; re-resolving is a no-op for them.
            assigned: step.vessel_slot(s.keyword).cloned().flatten(),
        })
        .collect();
    Ok(StepChain {
        addr: Some(addr),
        name: step.name(),
        temp: step.temp_requirement(),
        links,
    })
}

/// Build the chain, inlining repeat children so they participate in the
/// same neighbor relations as top-level steps.
pub fn build_chain(steps: &[Step]) -> Result<Vec<StepChain>, ResolveError> {
    let mut chains = Vec::new();
    for (idx, step) in steps.iter().enumerate() {
        match step {
            Step::Repeat(rep) => {
                for (c, child) in rep.children.iter().enumerate() {
                    chains.push(chain_for(child, StepAddr { idx, child: Some(c) })?);
                }
            }
            _ => chains.push(chain_for(step, StepAddr { idx, child: None })?),
        }
    }
    Ok(chains)
}

/// Write resolved assignments back into the step list.
pub fn write_back(steps: &mut [Step], chains: &[StepChain]) {
    for chain in chains {
        let Some(addr) = chain.addr else { continue };
        let target = match (&mut steps[addr.idx], addr.child) {
            (Step::Repeat(rep), Some(c)) => &mut rep.children[c],
            (step, _) => step,
        };
        for link in &chain.links {
            target.set_vessel_slot(link.keyword, link.assigned.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AddStep, RepeatStep, WaitStep};

    fn add(vessel: Option<&str>) -> Step {
        Step::Add(AddStep {
            reagent: "water".into(),
            vessel: vessel.map(String::from),
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

    #[test]
    fn preseeded_slot_survives_into_chain() {
        let chains = build_chain(&[add(Some("flask"))]).unwrap();
        assert_eq!(chains[0].links[0].assigned.as_deref(), Some("flask"));
    }

    #[test]
    fn repeat_children_are_inlined() {
        let steps = vec![Step::Repeat(RepeatStep {
            repeats: 3,
            children: vec![
                add(None),
                Step::Wait(WaitStep { time: None, temp_range: None }),
            ],
        })];
        let chains = build_chain(&steps).unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].addr, Some(StepAddr { idx: 0, child: Some(0) }));
        assert!(!chains[1].has_links());
    }

    #[test]
    fn write_back_reaches_repeat_children() {
        let mut steps = vec![Step::Repeat(RepeatStep {
            repeats: 2,
            children: vec![add(None)],
        })];
        let mut chains = build_chain(&steps).unwrap();
        chains[0].links[0].assigned = Some("reactor".into());
        write_back(&mut steps, &chains);
        let Step::Repeat(rep) = &steps[0] else { panic!() };
        let Step::Add(a) = &rep.children[0] else { panic!() };
        assert_eq!(a.vessel.as_deref(), Some("reactor"));
    }
}
