//! The per-step vessel chain templates: which vessel slots each step type
//! has, and the ordered rules for filling them.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Above this temperature the filter hardware is not a candidate vessel.
pub const MAX_FILTER_TEMP: f64 = 70.0;

/// One way of resolving a vessel slot. Rules on a slot are tried in order,
/// every propagation pass, until one produces a vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The boundary slot of the nearest following slotted step.
    Next,
    /// The boundary slot of the nearest preceding slotted step.
    Prev,
    /// A fixed piece of hardware.
    Definite(&'static str),
    /// Nearest assigned neighbor whose vessel tolerates this step's
    /// temperature.
    HeatCool,
    /// The destination of the nearest preceding separation.
    GroupTo,
    /// The opposite of the nearest assigned neighbor. Only reachable
    /// through a forced directive.
    Other,
}

#[derive(Debug, Clone, Copy)]
pub struct SlotTemplate {
    pub keyword: &'static str,
    pub rules: &'static [Rule],
}

const fn slot(keyword: &'static str, rules: &'static [Rule]) -> SlotTemplate {
    SlotTemplate { keyword, rules }
}

pub const PREV_NEXT: &[Rule] = &[Rule::Prev, Rule::Next];
pub const GROUP_TO_ONLY: &[Rule] = &[Rule::GroupTo];
pub const OTHER_ONLY: &[Rule] = &[Rule::Other];

pub static STEP_VESSEL_CHAINS: Lazy<HashMap<&'static str, Vec<SlotTemplate>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("Add", vec![slot("vessel", PREV_NEXT)]);
    m.insert(
        "Separate",
        vec![
            slot("from_vessel", &[Rule::Prev]),
            slot("separation_vessel", &[Rule::Definite("separator")]),
            slot("to_vessel", &[Rule::Next, Rule::GroupTo]),
        ],
    );
    m.insert("Filter", vec![slot("filter_vessel", &[Rule::Definite("filter")])]);
    m.insert("WashSolid", vec![slot("vessel", &[Rule::Definite("filter")])]);
    m.insert("Evaporate", vec![slot("vessel", &[Rule::Definite("rotavap")])]);
    m.insert("HeatChill", vec![slot("vessel", &[Rule::HeatCool])]);
    m.insert("Stir", vec![slot("vessel", PREV_NEXT)]);
    m.insert("Dry", vec![slot("vessel", PREV_NEXT)]);
    m.insert("Dissolve", vec![slot("vessel", PREV_NEXT)]);
    m.insert(
        "Transfer",
        vec![slot("from_vessel", &[Rule::Prev]), slot("to_vessel", &[Rule::Next])],
    );
    m.insert("Wait", vec![]);
    m.insert("Repeat", vec![]);
    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_slot_has_rules_or_none() {
        for (name, slots) in STEP_VESSEL_CHAINS.iter() {
            for s in slots {
                assert!(
                    !s.rules.is_empty(),
                    "slot {} of {} has no rules",
                    s.keyword,
                    name
                );
            }
        }
    }

    #[test]
    fn separate_resolves_in_flow_order() {
        let slots = &STEP_VESSEL_CHAINS["Separate"];
        assert_eq!(slots[0].keyword, "from_vessel");
        assert_eq!(slots[2].keyword, "to_vessel");
    }
}
