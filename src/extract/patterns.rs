//! The action pattern grammar.
//!
//! Patterns are generated, not hand-enumerated: a cross product of optional
//! prefix fragments, optional subject fragments and verb-group shapes.
//! None of the elements is `Opt`, so an element's index in the pattern is
//! its token offset in the matched run — the subject and verb positions are
//! known statically. The table is sorted longest-first; ties keep generation
//! order.

use once_cell::sync::Lazy;

use crate::tag::matcher::{Pat, match_at};
use crate::tag::token::{Action, Modifier, Pos, Sentence, Subject, TokKind, Token, join_text};

/// One generated action pattern with the token offsets that matter.
pub struct ExtractPattern {
    pub pattern: Vec<Pat>,
    /// Offset of the subject token, when the shape has one.
    pub subject_idx: Option<usize>,
    /// Offset of a leading modifier that belongs to every extracted verb.
    pub modifier_idx: Option<usize>,
    /// Offsets of the verb tokens; one action per verb.
    pub verb_idxs: Vec<usize>,
}

static EXTRACT_ACTION_PATTERNS: Lazy<Vec<ExtractPattern>> = Lazy::new(|| {
    let aux = Pat::AnyOf(&["was", "were"]);
    let conj = Pat::AnyOf(&["and", "then"]);
    let verb = Pat::Kind(TokKind::Verb);

    // Prefix fragments: nothing, "<modifier>," or a bare connective.
    let prefixes: Vec<(Vec<Pat>, Option<usize>)> = vec![
        (vec![Pat::Kind(TokKind::Modifier), Pat::Pos(Pos::Comma)], Some(0)),
        (vec![Pat::Lit("then")], None),
        (vec![], None),
    ];

    // Subject fragments: a reagent, a vessel, or nothing.
    let subjects: Vec<Vec<Pat>> = vec![
        vec![Pat::Kind(TokKind::Reagent)],
        vec![Pat::Kind(TokKind::Vessel)],
        vec![],
    ];

    // Verb-group shapes, with verb offsets relative to the group start.
    let groups: Vec<(Vec<Pat>, Vec<usize>)> = vec![
        (
            vec![
                aux.clone(),
                verb.clone(),
                Pat::Pos(Pos::Comma),
                verb.clone(),
                conj.clone(),
                verb.clone(),
            ],
            vec![1, 3, 5],
        ),
        (
            vec![aux.clone(), verb.clone(), conj.clone(), verb.clone()],
            vec![1, 3],
        ),
        (vec![aux.clone(), verb.clone()], vec![1]),
        (vec![verb.clone(), conj.clone(), verb.clone()], vec![0, 2]),
        (vec![verb.clone()], vec![0]),
    ];

    let mut out = Vec::new();
    for (prefix, modifier_idx) in &prefixes {
        for subject in &subjects {
            for (group, rel_verbs) in &groups {
                let mut pattern = prefix.clone();
                let subject_idx = if subject.is_empty() {
                    None
                } else {
                    let idx = pattern.len();
                    pattern.extend(subject.iter().cloned());
                    Some(idx)
                };
                let base = pattern.len();
                pattern.extend(group.iter().cloned());
                out.push(ExtractPattern {
                    pattern,
                    subject_idx,
                    modifier_idx: *modifier_idx,
                    verb_idxs: rel_verbs.iter().map(|v| v + base).collect(),
                });
            }
        }
    }
    out.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));
    out
});

fn subject_from(tok: &Token) -> Subject {
    match tok {
        Token::Reagent(r) => Subject::Reagent(r.clone()),
        Token::Vessel(v) => Subject::Vessel(v.canonical.clone()),
        t => Subject::Plain(t.text().to_string()),
    }
}

/// Apply the pattern table over one combined sentence, folding matched runs
/// into `Action` tokens. At each position the first (longest) matching
/// pattern wins.
pub fn apply_action_patterns(sentence: &mut Sentence) {
    let mut i = 0;
    while i < sentence.tokens.len() {
        let mut matched = false;
        for ep in EXTRACT_ACTION_PATTERNS.iter() {
            let Some(n) = match_at(&ep.pattern, &sentence.tokens[i..]) else {
                continue;
            };
            let run = &sentence.tokens[i..i + n];
            let text = join_text(run);
            let subject = ep.subject_idx.map(|s| subject_from(&run[s]));
            let lead_mod: Option<Modifier> = ep.modifier_idx.and_then(|m| match &run[m] {
                Token::Modifier(md) => Some(md.clone()),
                _ => None,
            });
            let mut folded = Vec::new();
            for &vi in &ep.verb_idxs {
                let Token::Verb(vp) = &run[vi] else { continue };
                let mut vp = vp.clone();
                if let Some(m) = &lead_mod {
                    vp.modifiers.push(m.clone());
                }
                folded.push(Token::Action(Action {
                    subject: subject.clone(),
                    verb: vp,
                    text: text.clone(),
                    order_pos: 0,
                }));
            }
            let count = folded.len();
            sentence.tokens.splice(i..i + n, folded);
            i += count;
            matched = true;
            break;
        }
        if !matched {
            i += 1;
        }
    }
}

/// Exposed for the pattern-precedence regression test: the generated table
/// must be non-increasing in pattern length.
pub fn action_pattern_lengths() -> Vec<usize> {
    EXTRACT_ACTION_PATTERNS
        .iter()
        .map(|p| p.pattern.len())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::combine::combine;
    use crate::tag;
    use crate::tag::token::VerbKind;

    fn actions(text: &str) -> Vec<Action> {
        let mut out = Vec::new();
        for mut s in tag::tag(text) {
            combine(&mut s);
            apply_action_patterns(&mut s);
            for t in s.tokens {
                if let Token::Action(a) = t {
                    out.push(a);
                }
            }
        }
        out
    }

    #[test]
    fn passive_with_reagent_subject() {
        let acts = actions("The mixture was stirred at 25°C.");
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].verb.kind, VerbKind::Stir);
        assert!(matches!(&acts[0].subject, Some(Subject::Reagent(r)) if r.name == "mixture"));
    }

    #[test]
    fn shared_subject_across_conjoined_verbs() {
        let acts = actions("The organic layer was washed with brine and dried.");
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].verb.kind, VerbKind::Wash);
        assert_eq!(acts[1].verb.kind, VerbKind::Dry);
        assert_eq!(acts[0].subject, acts[1].subject);
    }

    #[test]
    fn imperative_without_subject() {
        let acts = actions("Add sodium hydroxide (5 g) to the flask.");
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].verb.kind, VerbKind::Add);
        assert!(acts[0].subject.is_none());
    }

    #[test]
    fn table_is_sorted_longest_first() {
        let lens = action_pattern_lengths();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
    }
}
