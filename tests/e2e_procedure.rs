//! Whole-pipeline compilation of written procedures into resolved steps.

use chemcompiler::compile;
use chemcompiler::ir::{SeparationPurpose, Step};

fn slot<'a>(step: &'a Step, keyword: &str) -> Option<&'a str> {
    step.vessel_slot(keyword).and_then(|v| v.as_deref())
}

fn assert_all_slots_assigned(step: &Step) {
    if let Step::Repeat(rep) = step {
        for child in &rep.children {
            assert_all_slots_assigned(child);
        }
        return;
    }
    for k in step.vessel_keywords() {
        assert!(
            step.vessel_slot(k).is_some_and(Option::is_some),
            "{} slot '{k}' left unassigned",
            step.name()
        );
    }
}

#[test]
fn portionwise_addition_unrolls_into_a_repeat() {
    let steps = compile(
        "Benzylamine hydrochloride (5 g) was added portionwise in 10 portions every 5 min.",
    )
    .unwrap();
    assert_eq!(steps.len(), 1, "one repeat step expected: {steps:?}");
    let Step::Repeat(rep) = &steps[0] else {
        panic!("expected repeat, got {steps:?}");
    };
    assert_eq!(rep.repeats, 10);
    assert_eq!(rep.children.len(), 2);
    let Step::Add(add) = &rep.children[0] else {
        panic!("expected add, got {:?}", rep.children);
    };
    assert!(add.reagent.eq_ignore_ascii_case("benzylamine hydrochloride"));
    assert_eq!(add.vessel.as_deref(), Some("reactor"));
    let mass = add.mass.as_ref().expect("per-portion mass");
    assert_eq!(mass.value, Some(500.0));
    assert_eq!(mass.unit, "mg");
    assert!(matches!(
        &rep.children[1],
        Step::Wait(w) if w.time.as_ref().and_then(|t| t.value) == Some(5.0)
    ));
}

#[test]
fn add_extract_filter_stays_in_line() {
    let steps = compile(
        "Sodium hydroxide (5 g) was added to the reaction vessel. \
         The mixture was extracted with diethyl ether (50 mL). \
         The mixture was filtered.",
    )
    .unwrap();
    assert_eq!(steps.len(), 3, "no transfers expected: {steps:?}");
    assert!(!steps.iter().any(|s| matches!(s, Step::Transfer(_))));
    assert_eq!(slot(&steps[0], "vessel"), Some("reactor"));
    assert_eq!(slot(&steps[1], "from_vessel"), Some("reactor"));
    assert_eq!(slot(&steps[1], "separation_vessel"), Some("separator"));
    assert_eq!(slot(&steps[1], "to_vessel"), Some("filter"));
    assert_eq!(slot(&steps[2], "filter_vessel"), Some("filter"));
}

#[test]
fn aqueous_wash_compiles_as_extraction() {
    let steps = compile(
        "The aqueous layer was washed with diethyl ether (3 x 50 mL). \
         The combined organic layers were washed with brine (50 mL).",
    )
    .unwrap();
    assert_eq!(steps.len(), 2, "two separations expected: {steps:?}");
    let (Step::Separate(first), Step::Separate(second)) = (&steps[0], &steps[1]) else {
        panic!("expected two separations, got {steps:?}");
    };
    assert_eq!(first.purpose, SeparationPurpose::Extract);
    assert_eq!(first.repeats, 3);
    assert!(first.solvent.as_deref().is_some_and(|s| s.contains("ether")));
    assert_eq!(second.purpose, SeparationPurpose::Wash);
    // The extract hands the kept phase straight to the following wash.
    assert_eq!(first.to_vessel.as_deref(), Some("separator"));
    assert_eq!(second.from_vessel.as_deref(), Some("separator"));
}

#[test]
fn merged_addition_keeps_its_temperature() {
    let steps =
        compile("Hydrochloric acid (10 mL) was added. It was added dropwise at 0°C.").unwrap();
    assert_eq!(steps.len(), 1, "duplicate add should merge: {steps:?}");
    let Step::Add(add) = &steps[0] else {
        panic!("expected add, got {steps:?}");
    };
    assert!(add.reagent.eq_ignore_ascii_case("hydrochloric acid"));
    assert_eq!(add.temp, Some(0.0));
    assert!(add.dropwise);
    assert_eq!(add.vessel.as_deref(), Some("reactor"));
}

#[test]
fn atmosphere_carries_onto_the_steps() {
    let steps = compile(
        "Water (20 mL) was added under nitrogen. \
         The mixture was heated to 80°C under argon.",
    )
    .unwrap();
    let Step::Add(add) = &steps[0] else {
        panic!("expected add, got {steps:?}");
    };
    assert_eq!(add.atmosphere.as_deref(), Some("nitrogen"));
    let heat = steps
        .iter()
        .find_map(|s| match s {
            Step::HeatChill(h) => Some(h),
            _ => None,
        })
        .expect("heat step missing");
    assert_eq!(heat.atmosphere.as_deref(), Some("argon"));
}

#[test]
fn full_procedure_resolves_every_vessel() {
    let steps = compile(
        "Sodium hydroxide (5 g) was added to the reaction vessel. \
         The mixture was heated to 80°C for 2 h. \
         The mixture was allowed to cool to room temperature. \
         The mixture was filtered. \
         The solvent was removed under reduced pressure.",
    )
    .unwrap();
    assert!(steps.len() >= 5, "steps went missing: {steps:?}");
    for step in &steps {
        assert_all_slots_assigned(step);
    }
    // The hot step must not sit in the filter.
    for step in &steps {
        if let Step::HeatChill(h) = step {
            if h.temp.is_some_and(|t| t > 70.0) {
                assert_ne!(h.vessel.as_deref(), Some("filter"));
            }
        }
    }
    let names: Vec<_> = steps.iter().map(Step::name).collect();
    assert!(names.contains(&"Filter"));
    assert!(names.contains(&"Evaporate"));
}

#[test]
fn compiled_output_survives_recompilation_of_steps() {
    let mut steps = compile(
        "Water (20 mL) was added. The mixture was stirred for 1 h. The mixture was filtered.",
    )
    .unwrap();
    let once = steps.clone();
    chemcompiler::resolve::resolve(&mut steps, &[]).unwrap();
    assert_eq!(steps, once);
}
