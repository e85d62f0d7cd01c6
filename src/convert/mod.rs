//! Conversion: sanitized actions to executable steps.
//!
//! One sanitized action becomes zero or more steps. Vessel slots mostly
//! stay `None` here; only separation routing writes concrete pre-seeds,
//! which the resolver then treats as fixed.

use crate::ir::{
    AddStep, DissolveStep, DryStep, EvaporateStep, FilterStep, HeatChillStep, RepeatStep,
    SeparateStep, Step, StirStep, TransferStep, WaitStep, WashSolidStep,
};
use crate::sanitize::{AddAction, SanitizedAction, SeparateAction};
use crate::tag::token::{QuantityKind, Reagent, TempSpec};

fn add_step(action: &AddAction, reagent: &Reagent, featured: bool) -> Step {
    Step::Add(AddStep {
        reagent: reagent.name.clone(),
        vessel: action.vessel.clone(),
        volume: reagent.quantity_of(QuantityKind::Volume).cloned(),
        mass: reagent.quantity_of(QuantityKind::Mass).cloned(),
        amount: reagent.quantity_of(QuantityKind::Amount).cloned(),
        temp: if featured {
            action.temp.as_ref().and_then(TempSpec::celsius)
        } else {
            None
        },
        time: if featured { action.time.clone() } else { None },
        dropwise: featured && (action.dropwise || action.slow),
        stir: featured && action.stir,
        through: if featured { action.through.clone() } else { None },
        atmosphere: if featured { action.atmosphere.clone() } else { None },
    })
}

fn convert_add(action: &AddAction) -> Vec<Step> {
    let mut steps = Vec::new();
    let Some((last, rest)) = action.reagents.split_last() else {
        return steps;
    };
    // In-vessel reagents establish contents with plain additions.
    for r in rest {
        steps.push(add_step(action, r, false));
    }
    match (action.n_portions, &action.interval) {
        // Portionwise with a stated interval unrolls into a repeat of one
        // per-portion addition and the gap between portions.
        (Some(n), Some(interval)) if n > 1 => {
            let factor = 1.0 / f64::from(n);
            let mut portion = last.clone();
            portion.quantities = portion
                .quantities
                .iter()
                .map(|q| q.scaled(factor))
                .collect();
            let mut add = add_step(action, &portion, true);
            if let Step::Add(a) = &mut add {
                a.time = None;
            }
            steps.push(Step::Repeat(RepeatStep {
                repeats: n,
                children: vec![
                    add,
                    Step::Wait(WaitStep {
                        time: Some(interval.clone()),
                        temp_range: None,
                    }),
                ],
            }));
        }
        _ => steps.push(add_step(action, last, true)),
    }
    steps
}

fn convert_separate(action: &SeparateAction) -> Vec<Step> {
    let count = action.separations.len();
    action
        .separations
        .iter()
        .enumerate()
        .map(|(i, sep)| {
            let first = i == 0;
            let last = i + 1 == count;
            // Within a multi-solvent action the mixture never leaves the
            // separator; the action-level flags govern the outer ends.
            let from_vessel = if !first || action.from_separator {
                Some("separator".to_string())
            } else {
                None
            };
            let to_vessel = if !last || action.to_separator {
                Some("separator".to_string())
            } else {
                None
            };
            let waste_vessel = if last && action.waste_to_buffer {
                Some("buffer_flask1".to_string())
            } else {
                Some("waste".to_string())
            };
            Step::Separate(SeparateStep {
                purpose: action.purpose,
                solvent: sep.solvent.clone(),
                solvent_volume: sep.volume.clone(),
                repeats: sep.repeats,
                from_vessel,
                separation_vessel: None,
                to_vessel,
                waste_vessel,
            })
        })
        .collect()
}

/// Convert one sanitized action. An empty result is a valid no-op.
pub fn convert_action(action: &SanitizedAction) -> Vec<Step> {
    match action {
        SanitizedAction::Add(a) => convert_add(a),
        SanitizedAction::Separate(s) => convert_separate(s),
        SanitizedAction::HeatChill(h) => vec![Step::HeatChill(HeatChillStep {
            vessel: None,
            temp: h.temp.celsius(),
            time: h.time.clone(),
            active: h.active,
            stir: h.stir,
            atmosphere: h.atmosphere.clone(),
        })],
        SanitizedAction::Stir(s) => vec![Step::Stir(StirStep {
            vessel: None,
            time: s.time.clone(),
            speed: s.speed,
        })],
        SanitizedAction::Filter(f) => vec![Step::Filter(FilterStep {
            filter_vessel: None,
            time: f.time.clone(),
        })],
        SanitizedAction::Evaporate(e) => vec![Step::Evaporate(EvaporateStep {
            vessel: None,
            temp: e.temp,
            time: e.time.clone(),
        })],
        SanitizedAction::Dry(d) => vec![Step::Dry(DryStep {
            vessel: None,
            time: d.time.clone(),
            temp: d.temp,
            agent: d.agent.clone(),
        })],
        SanitizedAction::Dissolve(d) => vec![Step::Dissolve(DissolveStep {
            vessel: None,
            solvent: d.solvent.clone(),
            volume: d.volume.clone(),
            temp: d.temp,
            time: d.time.clone(),
        })],
        SanitizedAction::Wait(w) => vec![Step::Wait(WaitStep {
            time: w.time.clone(),
            temp_range: w.temp_range,
        })],
        SanitizedAction::WashSolid(w) => vec![Step::WashSolid(WashSolidStep {
            vessel: None,
            solvent: w.solvent.clone(),
            volume: w.volume.clone(),
            repeats: w.repeats,
        })],
    }
}

/// Convert a sanitized action list into the flat step list.
pub fn convert(actions: &[SanitizedAction]) -> Vec<Step> {
    let steps: Vec<Step> = actions.iter().flat_map(|a| convert_action(a)).collect();
    tracing::debug!(actions = actions.len(), steps = steps.len(), "conversion complete");
    steps
}

// Transfers are only created by the resolver, but the constructor lives
// here with the other step builders.
pub(crate) fn transfer(from: String, to: String) -> Step {
    Step::Transfer(TransferStep {
        from_vessel: Some(from),
        to_vessel: Some(to),
        volume: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::SeparationPurpose;
    use crate::sanitize::Separation;
    use crate::tag::token::Quantity;

    #[test]
    fn portionwise_add_unrolls_to_repeat() {
        let mut reagent = Reagent::simple("sodium hydroxide");
        reagent
            .quantities
            .push(Quantity::new(QuantityKind::Mass, 5.0, "g", "5 g"));
        let action = AddAction {
            reagents: vec![reagent],
            vessel: None,
            temp: None,
            time: None,
            interval: Some(Quantity::new(QuantityKind::Time, 5.0, "min", "5 min")),
            dropwise: false,
            slow: false,
            n_portions: Some(10),
            through: None,
            atmosphere: None,
            stir: false,
            stir_speed: None,
        };
        let steps = convert_add(&action);
        assert_eq!(steps.len(), 1);
        let Step::Repeat(rep) = &steps[0] else {
            panic!("expected repeat, got {steps:?}");
        };
        assert_eq!(rep.repeats, 10);
        assert_eq!(rep.children.len(), 2);
        let Step::Add(add) = &rep.children[0] else { panic!() };
        let mass = add.mass.as_ref().unwrap();
        assert_eq!(mass.value, Some(500.0));
        assert_eq!(mass.unit, "mg");
        assert!(matches!(&rep.children[1], Step::Wait(w) if w.time.is_some()));
    }

    #[test]
    fn multi_solvent_wash_chains_in_separator() {
        let action = SeparateAction {
            purpose: SeparationPurpose::Wash,
            separations: vec![
                Separation { solvent: Some("water".into()), volume: None, repeats: 1 },
                Separation { solvent: Some("brine".into()), volume: None, repeats: 1 },
            ],
            target_layer: None,
            solvent_layer: None,
            from_separator: false,
            to_separator: false,
            waste_to_buffer: false,
        };
        let steps = convert_separate(&action);
        assert_eq!(steps.len(), 2);
        let (Step::Separate(a), Step::Separate(b)) = (&steps[0], &steps[1]) else {
            panic!()
        };
        assert_eq!(a.from_vessel, None);
        assert_eq!(a.to_vessel.as_deref(), Some("separator"));
        assert_eq!(b.from_vessel.as_deref(), Some("separator"));
        assert_eq!(b.to_vessel, None);
    }
}
