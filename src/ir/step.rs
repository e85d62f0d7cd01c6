//! The step IR: the flat, executable operation list the resolver works on.
//!
//! Every step is a struct variant with its vessel slots as `Option<String>`
//! fields. A `None` slot is an unresolved vessel; resolution must leave no
//! `None` behind. Slot access goes through `vessel_slot`/`set_vessel_slot`
//! keyed by the slot keyword, so the resolver never matches on variants.

use serde::{Deserialize, Serialize};

use crate::tag::token::Quantity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationPurpose {
    Wash,
    Extract,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddStep {
    pub reagent: String,
    pub vessel: Option<String>,
    pub volume: Option<Quantity>,
    pub mass: Option<Quantity>,
    pub amount: Option<Quantity>,
    pub temp: Option<f64>,
    pub time: Option<Quantity>,
    pub dropwise: bool,
    pub stir: bool,
    /// Filtration medium in the addition path ("celite").
    pub through: Option<String>,
    /// Inert gas blanket over the addition ("nitrogen").
    pub atmosphere: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferStep {
    pub from_vessel: Option<String>,
    pub to_vessel: Option<String>,
    pub volume: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparateStep {
    pub purpose: SeparationPurpose,
    pub solvent: Option<String>,
    pub solvent_volume: Option<Quantity>,
    pub repeats: u32,
    pub from_vessel: Option<String>,
    pub separation_vessel: Option<String>,
    pub to_vessel: Option<String>,
    /// Where the discarded phase goes. Not part of the resolution chain.
    pub waste_vessel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStep {
    pub filter_vessel: Option<String>,
    pub time: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashSolidStep {
    pub vessel: Option<String>,
    pub solvent: Option<String>,
    pub volume: Option<Quantity>,
    pub repeats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatChillStep {
    pub vessel: Option<String>,
    pub temp: Option<f64>,
    pub time: Option<Quantity>,
    /// Active temperature control versus passive drift.
    pub active: bool,
    pub stir: bool,
    pub atmosphere: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaporateStep {
    pub vessel: Option<String>,
    pub temp: Option<f64>,
    pub time: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryStep {
    pub vessel: Option<String>,
    pub time: Option<Quantity>,
    pub temp: Option<f64>,
    /// Chemical drying agent ("magnesium sulfate"), when one was named.
    pub agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirStep {
    pub vessel: Option<String>,
    pub time: Option<Quantity>,
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissolveStep {
    pub vessel: Option<String>,
    pub solvent: Option<String>,
    pub volume: Option<Quantity>,
    pub temp: Option<f64>,
    pub time: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitStep {
    pub time: Option<Quantity>,
    /// Ambient tolerance band in °C when no explicit temperature was given.
    pub temp_range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatStep {
    pub repeats: u32,
    pub children: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add(AddStep),
    Transfer(TransferStep),
    Separate(SeparateStep),
    Filter(FilterStep),
    WashSolid(WashSolidStep),
    HeatChill(HeatChillStep),
    Evaporate(EvaporateStep),
    Dry(DryStep),
    Stir(StirStep),
    Dissolve(DissolveStep),
    Wait(WaitStep),
    Repeat(RepeatStep),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Add(_) => "Add",
            Step::Transfer(_) => "Transfer",
            Step::Separate(_) => "Separate",
            Step::Filter(_) => "Filter",
            Step::WashSolid(_) => "WashSolid",
            Step::HeatChill(_) => "HeatChill",
            Step::Evaporate(_) => "Evaporate",
            Step::Dry(_) => "Dry",
            Step::Stir(_) => "Stir",
            Step::Dissolve(_) => "Dissolve",
            Step::Wait(_) => "Wait",
            Step::Repeat(_) => "Repeat",
        }
    }

    /// The step's vessel slot keywords, in flow order (source before
    /// destination). Empty for steps without vessels.
    pub fn vessel_keywords(&self) -> &'static [&'static str] {
        match self {
            Step::Add(_)
            | Step::WashSolid(_)
            | Step::HeatChill(_)
            | Step::Evaporate(_)
            | Step::Dry(_)
            | Step::Stir(_)
            | Step::Dissolve(_) => &["vessel"],
            Step::Transfer(_) => &["from_vessel", "to_vessel"],
            Step::Separate(_) => &["from_vessel", "separation_vessel", "to_vessel"],
            Step::Filter(_) => &["filter_vessel"],
            Step::Wait(_) | Step::Repeat(_) => &[],
        }
    }

    pub fn vessel_slot(&self, keyword: &str) -> Option<&Option<String>> {
        match (self, keyword) {
            (Step::Add(s), "vessel") => Some(&s.vessel),
            (Step::Add(s), "through") => Some(&s.through),
            (Step::Transfer(s), "from_vessel") => Some(&s.from_vessel),
            (Step::Transfer(s), "to_vessel") => Some(&s.to_vessel),
            (Step::Separate(s), "from_vessel") => Some(&s.from_vessel),
            (Step::Separate(s), "separation_vessel") => Some(&s.separation_vessel),
            (Step::Separate(s), "to_vessel") => Some(&s.to_vessel),
            (Step::Separate(s), "waste_vessel") => Some(&s.waste_vessel),
            (Step::Filter(s), "filter_vessel") => Some(&s.filter_vessel),
            (Step::WashSolid(s), "vessel") => Some(&s.vessel),
            (Step::HeatChill(s), "vessel") => Some(&s.vessel),
            (Step::Evaporate(s), "vessel") => Some(&s.vessel),
            (Step::Dry(s), "vessel") => Some(&s.vessel),
            (Step::Stir(s), "vessel") => Some(&s.vessel),
            (Step::Dissolve(s), "vessel") => Some(&s.vessel),
            _ => None,
        }
    }

    pub fn set_vessel_slot(&mut self, keyword: &str, value: Option<String>) -> bool {
        let slot = match (self, keyword) {
            (Step::Add(s), "vessel") => &mut s.vessel,
            (Step::Add(s), "through") => &mut s.through,
            (Step::Transfer(s), "from_vessel") => &mut s.from_vessel,
            (Step::Transfer(s), "to_vessel") => &mut s.to_vessel,
            (Step::Separate(s), "from_vessel") => &mut s.from_vessel,
            (Step::Separate(s), "separation_vessel") => &mut s.separation_vessel,
            (Step::Separate(s), "to_vessel") => &mut s.to_vessel,
            (Step::Separate(s), "waste_vessel") => &mut s.waste_vessel,
            (Step::Filter(s), "filter_vessel") => &mut s.filter_vessel,
            (Step::WashSolid(s), "vessel") => &mut s.vessel,
            (Step::HeatChill(s), "vessel") => &mut s.vessel,
            (Step::Evaporate(s), "vessel") => &mut s.vessel,
            (Step::Dry(s), "vessel") => &mut s.vessel,
            (Step::Stir(s), "vessel") => &mut s.vessel,
            (Step::Dissolve(s), "vessel") => &mut s.vessel,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Temperature this step holds its vessel at, when it constrains
    /// neighboring vessel choice.
    pub fn temp_requirement(&self) -> Option<f64> {
        match self {
            Step::HeatChill(s) => s.temp,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn slot_roundtrip() {
        let mut s = add();
        assert_eq!(s.vessel_slot("vessel"), Some(&None));
        assert!(s.set_vessel_slot("vessel", Some("reactor".into())));
        assert_eq!(s.vessel_slot("vessel"), Some(&Some("reactor".into())));
    }

    #[test]
    fn unknown_keyword_rejected() {
        let mut s = add();
        assert!(!s.set_vessel_slot("filter_vessel", Some("filter".into())));
        assert!(s.vessel_slot("filter_vessel").is_none());
    }

    #[test]
    fn keywords_in_flow_order() {
        let t = Step::Transfer(TransferStep {
            from_vessel: None,
            to_vessel: None,
            volume: None,
        });
        assert_eq!(t.vessel_keywords(), ["from_vessel", "to_vessel"]);
    }
}
