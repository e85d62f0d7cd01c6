//! Per-verb sanitizers. Each one reads an extracted action's modifiers and
//! produces the corresponding sanitized shape, or `None` when the action
//! carries nothing executable. Redirects (a "remove" that is really an
//! evaporation, a "wash" of a solid) happen here, not downstream.

use crate::ir::SeparationPurpose;
use crate::tag::token::{
    Action, AdditionStyle, ModifierKind, Prep, Quantity, QuantityKind, Reagent, Subject,
    TechniqueKind, TempSpec, VerbKind,
};

use super::action::{
    AddAction, DissolveAction, DryAction, EvaporateAction, FilterAction, HeatChillAction,
    Layer, SanitizedAction, SeparateAction, Separation, StirAction, WaitAction,
    WashSolidAction,
};

// ---------------------------------------------------------------------------
// modifier readers
// ---------------------------------------------------------------------------

fn temp_of(action: &Action) -> Option<TempSpec> {
    action.verb.modifiers.iter().find_map(|m| match &m.kind {
        ModifierKind::Temperature(t) => Some(t.clone()),
        _ => None,
    })
}

fn duration_of(action: &Action) -> Option<Quantity> {
    action.verb.modifiers.iter().find_map(|m| match &m.kind {
        ModifierKind::Time(t) if !t.interval => Some(t.quantity.clone()),
        _ => None,
    })
}

fn interval_of(action: &Action) -> Option<Quantity> {
    action.verb.modifiers.iter().find_map(|m| match &m.kind {
        ModifierKind::Time(t) if t.interval => Some(t.quantity.clone()),
        _ => None,
    })
}

fn vessel_of(action: &Action) -> Option<String> {
    let from_mod = action.verb.modifiers.iter().find_map(|m| match &m.kind {
        ModifierKind::Vessel(v) => Some(v.clone()),
        _ => None,
    });
    from_mod.or_else(|| match &action.subject {
        Some(Subject::Vessel(v)) => Some(v.clone()),
        _ => None,
    })
}

fn techniques_of(action: &Action) -> Vec<TechniqueKind> {
    action
        .verb
        .modifiers
        .iter()
        .filter_map(|m| match &m.kind {
            ModifierKind::Technique(t) => Some(*t),
            _ => None,
        })
        .collect()
}

fn repeats_of(action: &Action) -> u32 {
    action
        .verb
        .modifiers
        .iter()
        .find_map(|m| match &m.kind {
            ModifierKind::Repeat(n) => Some(*n),
            _ => None,
        })
        .unwrap_or(1)
}

fn stir_speed_of(action: &Action) -> (bool, Option<f64>) {
    for m in &action.verb.modifiers {
        if let ModifierKind::Stirring(s) = &m.kind {
            return (true, s.speed);
        }
    }
    (false, None)
}

fn atmosphere_of(action: &Action) -> Option<String> {
    action.verb.modifiers.iter().find_map(|m| match &m.kind {
        ModifierKind::Atmosphere(a) => Some(a.clone()),
        _ => None,
    })
}

/// Prepositioned reagents, flattened to simple constituents, each paired
/// with the preposition that introduced it.
fn reagents_of(action: &Action) -> Vec<(Reagent, Prep)> {
    let mut out = Vec::new();
    for m in &action.verb.modifiers {
        if let ModifierKind::Reagent(rm) = &m.kind {
            for r in &rm.reagents {
                for flat in r.flatten() {
                    out.push((flat, rm.prep));
                }
            }
        }
    }
    out
}

/// Nouns that name the material being worked rather than a new reagent;
/// placeholder subjects matching these never become added reagents.
const PROCESS_WORDS: &[&str] = &[
    "mixture", "solution", "layer", "layers", "residue", "solid", "precipitate",
    "filtrate", "contents", "product", "crystals", "suspension", "slurry",
];

fn subject_is_material(action: &Action) -> bool {
    match &action.subject {
        Some(s) => {
            let lower = s.text().to_ascii_lowercase();
            PROCESS_WORDS.iter().any(|w| lower.contains(w))
        }
        None => false,
    }
}

fn subject_reagent(action: &Action) -> Option<Reagent> {
    match &action.subject {
        Some(Subject::Reagent(r)) if !subject_is_material(action) => Some(r.clone()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// per-verb sanitizers
// ---------------------------------------------------------------------------

fn sanitize_add(action: &Action) -> Option<SanitizedAction> {
    let techniques = techniques_of(action);
    if techniques.contains(&TechniqueKind::Filtration) {
        return Some(SanitizedAction::Filter(FilterAction {
            time: duration_of(action),
        }));
    }
    if techniques.contains(&TechniqueKind::Evaporation)
        || techniques.contains(&TechniqueKind::Vacuum)
    {
        return Some(SanitizedAction::Evaporate(EvaporateAction {
            temp: temp_of(action).and_then(|t| t.celsius()),
            time: duration_of(action),
        }));
    }

    // Entry order: reagents already in the vessel ("to a solution of X")
    // precede the ones being introduced.
    let mut in_vessel = Vec::new();
    let mut incoming = Vec::new();
    for (r, prep) in reagents_of(action) {
        match prep {
            Prep::To | Prep::In => in_vessel.push(r),
            _ => incoming.push(r),
        }
    }
    if let Some(r) = subject_reagent(action) {
        let mut flat = r.flatten();
        flat.extend(incoming);
        incoming = flat;
    }
    let mut reagents = in_vessel;
    reagents.extend(incoming);
    if reagents.is_empty() {
        tracing::debug!(text = %action.text, "add without reagents dropped");
        return None;
    }

    let mut dropwise = false;
    let mut slow = false;
    let mut n_portions = None;
    let mut through = None;
    for m in &action.verb.modifiers {
        if let ModifierKind::Addition(spec) = &m.kind {
            match spec.style {
                Some(AdditionStyle::Dropwise) => dropwise = true,
                Some(AdditionStyle::Slow) => slow = true,
                Some(AdditionStyle::Portionwise) => {
                    n_portions = n_portions.or(spec.n_portions).or(Some(2));
                }
                None => {}
            }
            if spec.n_portions.is_some() {
                n_portions = spec.n_portions;
            }
            if spec.through.is_some() {
                through = spec.through.clone();
            }
        }
    }

    let (stir, stir_speed) = stir_speed_of(action);
    Some(SanitizedAction::Add(AddAction {
        reagents,
        vessel: vessel_of(action),
        temp: temp_of(action),
        time: duration_of(action),
        interval: interval_of(action),
        dropwise,
        slow,
        n_portions,
        through,
        atmosphere: atmosphere_of(action),
        stir,
        stir_speed,
    }))
}

fn sanitize_stir(action: &Action) -> Option<SanitizedAction> {
    if let Some(temp) = temp_of(action) {
        return Some(SanitizedAction::HeatChill(HeatChillAction {
            temp,
            time: duration_of(action),
            active: true,
            stir: true,
            atmosphere: atmosphere_of(action),
        }));
    }
    let (_, speed) = stir_speed_of(action);
    Some(SanitizedAction::Stir(StirAction {
        time: duration_of(action),
        speed,
    }))
}

fn sanitize_heat_cool(action: &Action) -> Option<SanitizedAction> {
    let temp = match temp_of(action) {
        Some(t) => t,
        None if techniques_of(action).contains(&TechniqueKind::Reflux) => {
            TempSpec::Vague("reflux".into())
        }
        None if action.verb.kind == VerbKind::Cool => TempSpec::RoomTemp,
        None => return None,
    };
    // "was allowed to cool" is passive drift, not temperature control.
    let active = !action.text.to_ascii_lowercase().contains("allowed");
    let (stir, _) = stir_speed_of(action);
    Some(SanitizedAction::HeatChill(HeatChillAction {
        temp,
        time: duration_of(action),
        active,
        stir,
        atmosphere: atmosphere_of(action),
    }))
}

const SOLID_WORDS: &[&str] = &["solid", "precipitate", "crystals", "cake", "residue"];

fn subject_is_solid(action: &Action) -> bool {
    action.subject.as_ref().is_some_and(|s| {
        let lower = s.text().to_ascii_lowercase();
        SOLID_WORDS.iter().any(|w| lower.contains(w))
    })
}

fn separate(action: &Action, purpose: SeparationPurpose) -> SanitizedAction {
    let repeats = repeats_of(action);
    let mut separations: Vec<Separation> = reagents_of(action)
        .into_iter()
        .map(|(r, _)| {
            // "(3 x 50 mL)" puts the repeat count inside the reagent.
            let reps = r
                .quantity_of(QuantityKind::Multiplier)
                .and_then(|q| q.value)
                .map(|v| v as u32)
                .unwrap_or(repeats);
            let volume = r.quantity_of(QuantityKind::Volume).cloned();
            Separation { solvent: Some(r.name), volume, repeats: reps }
        })
        .collect();
    if separations.is_empty() {
        separations.push(Separation { solvent: None, volume: None, repeats });
    }
    let target_layer = action.subject.as_ref().and_then(|s| {
        let lower = s.text().to_ascii_lowercase();
        if lower.contains("aqueous") {
            Some(Layer::Aqueous)
        } else if lower.contains("organic") {
            Some(Layer::Organic)
        } else {
            None
        }
    });
    let solvent_layer = separations
        .iter()
        .find_map(|s| s.solvent.as_deref().and_then(Layer::of_solvent));
    SanitizedAction::Separate(SeparateAction {
        purpose,
        separations,
        target_layer,
        solvent_layer,
        from_separator: false,
        to_separator: false,
        waste_to_buffer: false,
    })
}

fn sanitize_wash(action: &Action) -> Option<SanitizedAction> {
    if subject_is_solid(action) {
        let solvent = reagents_of(action).into_iter().next();
        return Some(SanitizedAction::WashSolid(WashSolidAction {
            volume: solvent
                .as_ref()
                .and_then(|(r, _)| r.quantity_of(QuantityKind::Volume).cloned()),
            solvent: solvent.map(|(r, _)| r.name),
            repeats: repeats_of(action),
        }));
    }
    Some(separate(action, SeparationPurpose::Wash))
}

fn sanitize_dry(action: &Action) -> Option<SanitizedAction> {
    Some(SanitizedAction::Dry(DryAction {
        time: duration_of(action),
        temp: temp_of(action).and_then(|t| t.celsius()),
        agent: reagents_of(action).into_iter().next().map(|(r, _)| r.name),
    }))
}

fn sanitize_dissolve(action: &Action) -> Option<SanitizedAction> {
    // The solvent is the in-phrase reagent; any other reagent loses to it.
    let reagents = reagents_of(action);
    let solvent = reagents
        .iter()
        .find(|(_, p)| *p == Prep::In)
        .or_else(|| reagents.first());
    Some(SanitizedAction::Dissolve(DissolveAction {
        volume: solvent
            .and_then(|(r, _)| r.quantity_of(QuantityKind::Volume).cloned()),
        solvent: solvent.map(|(r, _)| r.name.clone()),
        temp: temp_of(action).and_then(|t| t.celsius()),
        time: duration_of(action),
    }))
}

fn sanitize_wait(action: &Action) -> Option<SanitizedAction> {
    let temp_range = match temp_of(action).and_then(|t| t.celsius()) {
        Some(c) => Some((c, c)),
        // Unstated wait temperature means ambient, tolerated as a band.
        None => Some((18.0, 25.0)),
    };
    Some(SanitizedAction::Wait(WaitAction {
        time: duration_of(action),
        temp_range,
    }))
}

fn sanitize_remove(action: &Action) -> Option<SanitizedAction> {
    let techniques = techniques_of(action);
    if techniques.contains(&TechniqueKind::Filtration) {
        return Some(SanitizedAction::Filter(FilterAction {
            time: duration_of(action),
        }));
    }
    if techniques.contains(&TechniqueKind::Evaporation)
        || techniques.contains(&TechniqueKind::Vacuum)
        || action.text.to_ascii_lowercase().contains("solvent")
    {
        return Some(SanitizedAction::Evaporate(EvaporateAction {
            temp: temp_of(action).and_then(|t| t.celsius()),
            time: duration_of(action),
        }));
    }
    if techniques.contains(&TechniqueKind::Drying) {
        return sanitize_dry(action);
    }
    tracing::debug!(text = %action.text, "remove without recognizable technique dropped");
    None
}

/// Sanitize one extracted action. `None` means the action carries nothing
/// the executable plan can represent; compilation continues without it.
pub fn sanitize(action: &Action) -> Option<SanitizedAction> {
    match action.verb.kind {
        VerbKind::Add => sanitize_add(action),
        VerbKind::Stir => sanitize_stir(action),
        VerbKind::Heat | VerbKind::Cool => sanitize_heat_cool(action),
        VerbKind::Wash => sanitize_wash(action),
        VerbKind::Extract => Some(separate(action, SeparationPurpose::Extract)),
        VerbKind::Filter => Some(SanitizedAction::Filter(FilterAction {
            time: duration_of(action),
        })),
        VerbKind::Evaporate => Some(SanitizedAction::Evaporate(EvaporateAction {
            temp: temp_of(action).and_then(|t| t.celsius()),
            time: duration_of(action),
        })),
        VerbKind::Dry => sanitize_dry(action),
        VerbKind::Dissolve => sanitize_dissolve(action),
        VerbKind::Wait => sanitize_wait(action),
        VerbKind::Remove => sanitize_remove(action),
        VerbKind::Recrystallize | VerbKind::Discontinue | VerbKind::Other => {
            tracing::debug!(kind = ?action.verb.kind, "verb without sanitizer dropped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::tag;

    fn sanitized(text: &str) -> Vec<SanitizedAction> {
        extract(tag::tag(text))
            .iter()
            .filter_map(sanitize)
            .collect()
    }

    #[test]
    fn add_orders_in_vessel_reagents_first() {
        let acts = sanitized(
            "To a solution of sodium hydroxide (5 g) in water, \
             hydrochloric acid (10 mL) was added dropwise.",
        );
        let SanitizedAction::Add(add) = &acts[0] else {
            panic!("expected add, got {acts:?}");
        };
        assert!(add.dropwise);
        assert!(add.reagents.len() >= 3);
        assert_eq!(add.reagents[0].name, "sodium hydroxide");
        assert_eq!(add.reagents.last().map(|r| r.name.as_str()), Some("hydrochloric acid"));
    }

    #[test]
    fn stir_with_temperature_becomes_heatchill() {
        let acts = sanitized("The mixture was stirred at 0°C for 2 h.");
        assert!(matches!(
            &acts[0],
            SanitizedAction::HeatChill(h) if h.stir && h.temp == TempSpec::Exact(0.0)
        ));
    }

    #[test]
    fn wash_of_solid_redirects() {
        let acts = sanitized("The solid was washed with cold water.");
        assert!(matches!(
            &acts[0],
            SanitizedAction::WashSolid(w) if w.solvent.as_deref() == Some("cold water")
        ));
    }

    #[test]
    fn remove_solvent_is_evaporation() {
        let acts = sanitized("The solvent was removed under reduced pressure.");
        assert!(matches!(&acts[0], SanitizedAction::Evaporate(_)));
    }

    #[test]
    fn separation_layers_read_from_subject_and_solvent() {
        let acts = sanitized("The aqueous layer was extracted with dichloromethane (50 mL).");
        let SanitizedAction::Separate(sep) = &acts[0] else {
            panic!("expected separate, got {acts:?}");
        };
        assert_eq!(sep.target_layer, Some(Layer::Aqueous));
        assert_eq!(sep.solvent_layer, Some(Layer::Organic));
    }

    #[test]
    fn extract_repeats_counted() {
        let acts = sanitized("The aqueous layer was extracted with diethyl ether (3 x 50 mL).");
        let SanitizedAction::Separate(sep) = &acts[0] else {
            panic!("expected separate, got {acts:?}");
        };
        assert_eq!(sep.purpose, SeparationPurpose::Extract);
        assert_eq!(sep.separations[0].solvent.as_deref(), Some("diethyl ether"));
        assert_eq!(sep.separations[0].repeats, 3);
        assert_eq!(
            sep.separations[0].volume.as_ref().and_then(|v| v.value),
            Some(50.0)
        );
    }
}
