//! Context-sensitive disambiguation over the extracted action list.
//!
//! Each pass looks at neighboring actions and repairs what sentence-local
//! extraction cannot see: inherited temperatures, split additions, the
//! wash-that-is-really-an-extraction.

use crate::tag::token::{
    Action, Modifier, ModifierKind, Subject, TempSpec, Tense, VerbKind,
};

/// Verb pairs along which an explicit temperature flows forward.
const TEMP_INHERIT_PAIRS: &[(VerbKind, VerbKind)] = &[
    (VerbKind::Cool, VerbKind::Stir),
    (VerbKind::Heat, VerbKind::Stir),
    (VerbKind::Cool, VerbKind::Cool),
    (VerbKind::Heat, VerbKind::Heat),
    (VerbKind::Cool, VerbKind::Add),
    (VerbKind::Heat, VerbKind::Add),
];

fn temperature_of(action: &Action) -> Option<&Modifier> {
    action
        .verb
        .modifier(|k| matches!(k, ModifierKind::Temperature(_)))
}

fn temp_spec_of(action: &Action) -> Option<&TempSpec> {
    temperature_of(action).and_then(|m| match &m.kind {
        ModifierKind::Temperature(t) => Some(t),
        _ => None,
    })
}

/// A later action in an inheritance pair picks up the earlier one's
/// temperature when it has none, and a vague temperature yields to an
/// earlier exact one.
fn inherit_temperatures(actions: &mut [Action]) {
    for i in 1..actions.len() {
        let pair = (actions[i - 1].verb.kind, actions[i].verb.kind);
        if !TEMP_INHERIT_PAIRS.contains(&pair) {
            continue;
        }
        let Some(prev_mod) = temperature_of(&actions[i - 1]).cloned() else {
            continue;
        };
        match temp_spec_of(&actions[i]) {
            None => actions[i].verb.modifiers.push(prev_mod),
            Some(spec) if spec.is_vague() => {
                let prev_is_exact = temp_spec_of(&actions[i - 1])
                    .is_some_and(|s| !s.is_vague());
                if prev_is_exact {
                    actions[i]
                        .verb
                        .modifiers
                        .retain(|m| !matches!(m.kind, ModifierKind::Temperature(_)));
                    actions[i].verb.modifiers.push(prev_mod);
                }
            }
            Some(_) => {}
        }
    }
}

/// Unrecognized verbs with nothing attached carry no information. A
/// present-tense verb with neither subject nor modifiers is a noun
/// homograph ("the filter", "passed through a short wash") rather than an
/// instruction; procedures narrate in the past tense.
fn drop_uninformative(actions: &mut Vec<Action>) {
    actions.retain(|a| {
        if a.verb.kind == VerbKind::Other && a.verb.modifiers.is_empty() {
            return false;
        }
        a.verb.tense == Tense::Past || a.subject.is_some() || !a.verb.modifiers.is_empty()
    });
}

fn has_reagent_mod(action: &Action) -> bool {
    action
        .verb
        .modifier(|k| matches!(k, ModifierKind::Reagent(_)))
        .is_some()
}

fn same_or_absent_subject(a: &Action, b: &Action) -> bool {
    match (&a.subject, &b.subject) {
        (_, None) | (None, _) => true,
        (Some(x), Some(y)) => x.text() == y.text(),
    }
}

fn detail_score(action: &Action) -> usize {
    action
        .verb
        .modifiers
        .iter()
        .filter(|m| {
            matches!(
                m.kind,
                ModifierKind::Temperature(_) | ModifierKind::Time(_) | ModifierKind::Addition(_)
            )
        })
        .count()
}

/// Two consecutive additions where the second re-describes the first
/// (same subject, no new reagent) merge into the better-detailed one; the
/// reagent always travels to the survivor.
fn merge_duplicate_adds(actions: &mut Vec<Action>) {
    let mut i = 0;
    while i + 1 < actions.len() {
        let mergeable = actions[i].verb.kind == VerbKind::Add
            && actions[i + 1].verb.kind == VerbKind::Add
            && same_or_absent_subject(&actions[i], &actions[i + 1])
            && !has_reagent_mod(&actions[i + 1]);
        if !mergeable {
            i += 1;
            continue;
        }
        let (keep, drop) = if detail_score(&actions[i + 1]) > detail_score(&actions[i]) {
            (i + 1, i)
        } else {
            (i, i + 1)
        };
        let dropped = actions.remove(drop);
        let keep = if drop < keep { keep - 1 } else { keep };
        let winner = &mut actions[keep];
        for m in dropped.verb.modifiers {
            let covered = match &m.kind {
                ModifierKind::Reagent(_) => false,
                kind => winner
                    .verb
                    .modifiers
                    .iter()
                    .any(|w| std::mem::discriminant(&w.kind) == std::mem::discriminant(kind)),
            };
            if !covered {
                winner.verb.modifiers.push(m);
            }
        }
        if winner.subject.is_none() {
            winner.subject = dropped.subject;
        }
    }
}

/// "The addition funnel was charged with X. The contents were added ..." —
/// the funnel action is staging; the real addition inherits its reagent.
fn fold_addition_funnel(actions: &mut Vec<Action>) {
    let mut i = 0;
    while i + 1 < actions.len() {
        let staging = actions[i].verb.kind == VerbKind::Add
            && matches!(&actions[i].subject, Some(Subject::Vessel(v)) if v == "addition_funnel")
            && has_reagent_mod(&actions[i])
            && actions[i + 1].verb.kind == VerbKind::Add
            && !has_reagent_mod(&actions[i + 1]);
        if !staging {
            i += 1;
            continue;
        }
        let staged = actions.remove(i);
        let reagent_mods: Vec<Modifier> = staged
            .verb
            .modifiers
            .into_iter()
            .filter(|m| matches!(m.kind, ModifierKind::Reagent(_)))
            .collect();
        if let Some(first) = reagent_mods.first() {
            if let ModifierKind::Reagent(rm) = &first.kind {
                if let Some(r) = rm.reagents.first() {
                    actions[i].subject = Some(Subject::Reagent(r.clone()));
                }
            }
        }
        actions[i].verb.modifiers.extend(reagent_mods);
    }
}

const ORGANIC_SOLVENTS: &[&str] = &[
    "ether", "diethyl ether", "petroleum ether", "dichloromethane", "dcm", "chloroform",
    "ethyl acetate", "hexane", "hexanes", "pentane", "toluene", "benzene",
];

fn washes_with_organic(action: &Action) -> bool {
    action.verb.modifiers.iter().any(|m| match &m.kind {
        ModifierKind::Reagent(rm) => rm.reagents.iter().any(|r| {
            let lower = r.name.to_ascii_lowercase();
            ORGANIC_SOLVENTS.iter().any(|s| lower.contains(s))
        }),
        _ => false,
    })
}

fn subject_contains(action: &Action, needle: &str) -> bool {
    action
        .subject
        .as_ref()
        .is_some_and(|s| s.text().to_ascii_lowercase().contains(needle))
}

/// A "wash" of the aqueous layer with an organic solvent, followed by work
/// on the combined organic layers, is an extraction: the organic phase is
/// the one being kept.
fn reclassify_aqueous_wash(actions: &mut [Action]) {
    for i in 0..actions.len().saturating_sub(1) {
        let is_extraction = actions[i].verb.kind == VerbKind::Wash
            && subject_contains(&actions[i], "aqueous")
            && washes_with_organic(&actions[i])
            && actions[i + 1].verb.kind == VerbKind::Wash
            && subject_contains(&actions[i + 1], "combined organic");
        if is_extraction {
            actions[i].verb.kind = VerbKind::Extract;
        }
    }
}

/// Run all disambiguation passes, in order.
pub fn disambiguate(actions: &mut Vec<Action>) {
    inherit_temperatures(actions);
    drop_uninformative(actions);
    merge_duplicate_adds(actions);
    fold_addition_funnel(actions);
    reclassify_aqueous_wash(actions);
    for (i, a) in actions.iter_mut().enumerate() {
        a.order_pos = i;
    }
}
