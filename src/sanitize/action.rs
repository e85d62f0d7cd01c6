//! Sanitized action types: the verb-agnostic shapes one step removed from
//! the executable IR. Each extracted action maps to at most one of these;
//! an action that maps to none is dropped rather than failing the compile.

use serde::{Deserialize, Serialize};

use crate::ir::SeparationPurpose;
use crate::tag::token::{Quantity, Reagent, TempSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAction {
    /// Reagents in entry order: those already in the vessel first.
    pub reagents: Vec<Reagent>,
    pub vessel: Option<String>,
    pub temp: Option<TempSpec>,
    pub time: Option<Quantity>,
    /// Gap between portions ("every 5 min").
    pub interval: Option<Quantity>,
    pub dropwise: bool,
    pub slow: bool,
    pub n_portions: Option<u32>,
    pub through: Option<String>,
    pub atmosphere: Option<String>,
    pub stir: bool,
    pub stir_speed: Option<f64>,
}

/// One wash or extraction with a single solvent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Separation {
    pub solvent: Option<String>,
    pub volume: Option<Quantity>,
    pub repeats: u32,
}

/// Which phase of a two-phase mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Aqueous,
    Organic,
}

const AQUEOUS_MARKERS: &[&str] = &[
    "water", "brine", "acid", "bicarbonate", "carbonate", "hydroxide", "ammonium",
];

const ORGANIC_SOLVENTS: &[&str] = &[
    "ether", "dichloromethane", "dcm", "chloroform", "ethyl acetate", "hexane",
    "hexanes", "pentane", "toluene", "benzene",
];

impl Layer {
    pub fn opposite(self) -> Layer {
        match self {
            Layer::Aqueous => Layer::Organic,
            Layer::Organic => Layer::Aqueous,
        }
    }

    /// Phase a named solvent forms in a two-phase system.
    pub fn of_solvent(name: &str) -> Option<Layer> {
        let lower = name.to_ascii_lowercase();
        if ORGANIC_SOLVENTS.iter().any(|s| lower.contains(s)) {
            return Some(Layer::Organic);
        }
        if AQUEOUS_MARKERS.iter().any(|s| lower.contains(s)) {
            return Some(Layer::Aqueous);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparateAction {
    pub purpose: SeparationPurpose,
    pub separations: Vec<Separation>,
    /// Phase named by the action's subject ("the aqueous layer").
    pub target_layer: Option<Layer>,
    /// Phase the wash/extraction solvent forms.
    pub solvent_layer: Option<Layer>,
    /// Set by the whole-list separation pass: the mixture is already in the
    /// separator when this action starts.
    pub from_separator: bool,
    /// The retained phase stays in the separator for the next separation.
    pub to_separator: bool,
    /// The discarded phase is parked in a buffer flask instead of waste
    /// because a later separation works it.
    pub waste_to_buffer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatChillAction {
    pub temp: TempSpec,
    pub time: Option<Quantity>,
    pub active: bool,
    pub stir: bool,
    pub atmosphere: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirAction {
    pub time: Option<Quantity>,
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterAction {
    pub time: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaporateAction {
    pub temp: Option<f64>,
    pub time: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryAction {
    pub time: Option<Quantity>,
    pub temp: Option<f64>,
    pub agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissolveAction {
    pub solvent: Option<String>,
    pub volume: Option<Quantity>,
    pub temp: Option<f64>,
    pub time: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitAction {
    pub time: Option<Quantity>,
    /// Ambient band in °C when no explicit temperature was stated.
    pub temp_range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WashSolidAction {
    pub solvent: Option<String>,
    pub volume: Option<Quantity>,
    pub repeats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SanitizedAction {
    Add(AddAction),
    Separate(SeparateAction),
    HeatChill(HeatChillAction),
    Stir(StirAction),
    Filter(FilterAction),
    Evaporate(EvaporateAction),
    Dry(DryAction),
    Dissolve(DissolveAction),
    Wait(WaitAction),
    WashSolid(WashSolidAction),
}
