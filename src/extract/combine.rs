//! Verb/modifier combination: attach each modifier run to the verb that
//! governs it, before the action patterns ever run.
//!
//! Three rewrites, in order: collapse "allowed to <verb>" scaffolding,
//! absorb a sentence-leading modifier run across a passive auxiliary, then
//! sweep forward from every verb.

use crate::tag::token::{
    Modifier, ModifierKind, Pos, Prep, Reagent, ReagentMod, ReagentStructure, Sentence, Token,
};

fn reagent_mod(r: &Reagent) -> Modifier {
    let reagents = match &r.structure {
        ReagentStructure::Group(rs) => rs.clone(),
        _ => vec![r.clone()],
    };
    Modifier::new(
        ModifierKind::Reagent(ReagentMod { reagents, prep: Prep::None }),
        r.text.clone(),
    )
}

fn is_temp_or_time(kind: &ModifierKind) -> bool {
    matches!(kind, ModifierKind::Temperature(_) | ModifierKind::Time(_))
}

/// "was allowed to cool", "permitted to warm": drop the scaffolding words so
/// the auxiliary sits directly before the verb. The scaffold text moves into
/// the verb phrase; "allowed" marks passive drift for the sanitizers.
fn collapse_allowed_to(sentence: &mut Sentence) {
    let toks = &mut sentence.tokens;
    let mut i = 0;
    while i + 2 < toks.len() {
        let scaffold = (toks[i].is_word("allowed") || toks[i].is_word("permitted"))
            && toks[i + 1].is_word("to")
            && matches!(toks[i + 2], Token::Verb(_));
        if scaffold {
            let lead = format!("{} to", toks[i].text());
            if let Token::Verb(vp) = &mut toks[i + 2] {
                vp.text = format!("{lead} {}", vp.text);
            }
            toks.drain(i..i + 2);
        } else {
            i += 1;
        }
    }
}

/// "To the flask was added ..." — when everything before the auxiliary is
/// already modifiers, they belong to the verb after it.
fn backward_combine(sentence: &mut Sentence) {
    let toks = &mut sentence.tokens;
    let Some(v) = toks.iter().position(|t| matches!(t, Token::Verb(_))) else {
        return;
    };
    if v < 2 || !(toks[v - 1].is_word("was") || toks[v - 1].is_word("were")) {
        return;
    }
    let lead = &toks[..v - 1];
    let all_mods = lead
        .iter()
        .all(|t| matches!(t, Token::Modifier(_)) || t.pos() == Some(Pos::Comma));
    if !all_mods {
        return;
    }
    let mods: Vec<Modifier> = lead
        .iter()
        .filter_map(|t| match t {
            Token::Modifier(m) => Some(m.clone()),
            _ => None,
        })
        .collect();
    if let Token::Verb(vp) = &mut toks[v] {
        vp.modifiers.extend(mods);
    }
    toks.drain(..v - 1);
}

/// Absorb the modifier run following each verb. A bare reagent directly
/// after a verb reads as its object. A connective followed by a second
/// temperature/time modifier, when the verb already carries one, splits the
/// phrase into two verbs so "heated at 50°C for 1 h then at 100°C for 2 h"
/// yields two actions.
fn forward_combine(sentence: &mut Sentence) {
    let mut i = 0;
    while i < sentence.tokens.len() {
        let Token::Verb(vp) = &sentence.tokens[i] else {
            i += 1;
            continue;
        };
        let verb_clone = vp.clone();
        let mut mods: Vec<Modifier> = Vec::new();
        let mut j = i + 1;
        let mut split_at: Option<usize> = None;
        while j < sentence.tokens.len() {
            match &sentence.tokens[j] {
                Token::Modifier(m) => {
                    mods.push(m.clone());
                    j += 1;
                }
                Token::Reagent(r) => {
                    mods.push(reagent_mod(r));
                    j += 1;
                }
                t if t.pos() == Some(Pos::Comma)
                    && matches!(sentence.tokens.get(j + 1), Some(Token::Modifier(_))) =>
                {
                    j += 1;
                }
                t if (t.is_word("and") || t.is_word("then"))
                    && matches!(
                        sentence.tokens.get(j + 1),
                        Some(Token::Modifier(m)) if is_temp_or_time(&m.kind)
                    )
                    && mods.iter().any(|m| is_temp_or_time(&m.kind)) =>
                {
                    split_at = Some(j);
                    break;
                }
                _ => break,
            }
        }
        let mut absorbed = verb_clone.clone();
        absorbed.modifiers.extend(mods);
        sentence.tokens.splice(i..j, std::iter::once(Token::Verb(absorbed)));
        match split_at {
            Some(at) => {
                // The connective survived the splice at i+1; clone a bare
                // verb after it and let the next iteration absorb the rest.
                let connective = at - (j - i) + 1;
                let mut second = verb_clone;
                second.modifiers.clear();
                sentence
                    .tokens
                    .insert(connective + 1, Token::Verb(second));
                i = connective + 1;
            }
            None => i += 1,
        }
    }
}

/// Run all combination rewrites over one sentence.
pub fn combine(sentence: &mut Sentence) {
    collapse_allowed_to(sentence);
    backward_combine(sentence);
    forward_combine(sentence);
}
