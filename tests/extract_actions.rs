//! Action extraction over real sentences: subjects, conjoined verbs, and
//! the cross-sentence disambiguation passes.

use chemcompiler::interpret;
use chemcompiler::tag::token::{ModifierKind, Subject, TempSpec, VerbKind};

fn subject_text(s: &Option<Subject>) -> String {
    s.as_ref().map(|s| s.text().to_ascii_lowercase()).unwrap_or_default()
}

#[test]
fn prefixed_solution_attaches_to_the_addition() {
    let acts = interpret(
        "To a solution of sodium hydroxide (5 g) in water, \
         hydrochloric acid (10 mL) was added dropwise.",
    );
    assert_eq!(acts.len(), 1, "one action expected: {acts:?}");
    assert_eq!(acts[0].verb.kind, VerbKind::Add);
    assert!(subject_text(&acts[0].subject).contains("hydrochloric acid"));
    assert!(acts[0]
        .verb
        .modifier(|k| matches!(k, ModifierKind::Reagent(_)))
        .is_some());
    assert!(acts[0]
        .verb
        .modifier(|k| matches!(k, ModifierKind::Addition(_)))
        .is_some());
}

#[test]
fn conjoined_verbs_share_the_subject() {
    let acts = interpret("The mixture was washed with brine and dried.");
    assert_eq!(acts.len(), 2, "two actions expected: {acts:?}");
    assert_eq!(acts[0].verb.kind, VerbKind::Wash);
    assert_eq!(acts[1].verb.kind, VerbKind::Dry);
    assert_eq!(subject_text(&acts[0].subject), subject_text(&acts[1].subject));
}

#[test]
fn then_clause_splits_into_two_actions() {
    let acts = interpret("The mixture was heated at 50°C for 1 h then at 100°C for 2 h.");
    assert_eq!(acts.len(), 2, "two actions expected: {acts:?}");
    let temps: Vec<_> = acts
        .iter()
        .map(|a| {
            a.verb.modifier(|k| matches!(k, ModifierKind::Temperature(_)))
                .and_then(|m| match &m.kind {
                    ModifierKind::Temperature(TempSpec::Exact(t)) => Some(*t),
                    _ => None,
                })
        })
        .collect();
    assert_eq!(temps, vec![Some(50.0), Some(100.0)]);
}

#[test]
fn stir_inherits_temperature_across_sentences() {
    let acts = interpret("The mixture was cooled to 0°C. The mixture was stirred for 2 h.");
    assert_eq!(acts.len(), 2);
    assert_eq!(acts[1].verb.kind, VerbKind::Stir);
    assert!(matches!(
        acts[1].verb.modifier(|k| matches!(k, ModifierKind::Temperature(_))),
        Some(m) if matches!(&m.kind, ModifierKind::Temperature(TempSpec::Exact(t)) if *t == 0.0)
    ));
}

#[test]
fn aqueous_wash_before_combined_organics_is_an_extraction() {
    let acts = interpret(
        "The aqueous layer was washed with diethyl ether (3 x 50 mL). \
         The combined organic layers were washed with brine (50 mL).",
    );
    assert_eq!(acts.len(), 2);
    assert_eq!(acts[0].verb.kind, VerbKind::Extract);
    assert_eq!(acts[1].verb.kind, VerbKind::Wash);
}

#[test]
fn duplicate_additions_merge_and_keep_detail() {
    let acts = interpret("Hydrochloric acid (10 mL) was added. It was added dropwise at 0°C.");
    assert_eq!(acts.len(), 1, "duplicate add should merge: {acts:?}");
    assert!(subject_text(&acts[0].subject).contains("hydrochloric acid"));
    assert!(matches!(
        acts[0].verb.modifier(|k| matches!(k, ModifierKind::Temperature(_))),
        Some(m) if matches!(&m.kind, ModifierKind::Temperature(TempSpec::Exact(t)) if *t == 0.0)
    ));
    assert!(acts[0]
        .verb
        .modifier(|k| matches!(k, ModifierKind::Addition(_)))
        .is_some());
}

#[test]
fn order_positions_are_sequential() {
    let acts = interpret(
        "Water (20 mL) was added. The mixture was stirred for 1 h. \
         The mixture was filtered.",
    );
    let positions: Vec<_> = acts.iter().map(|a| a.order_pos).collect();
    assert_eq!(positions, (0..acts.len()).collect::<Vec<_>>());
}
