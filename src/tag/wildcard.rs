//! Wildcard tagging — the final, deliberately permissive fallback.
//!
//! Anything still untyped after the earlier passes folds into a generic
//! shape so it cannot corrupt action extraction: prepositional-phrase-shaped
//! runs become modifiers, noun-phrase-shaped runs become placeholder
//! reagents. "No parse" is not representable; the closest approximation is.

use super::token::{
    Modifier, ModifierKind, Pos, Prep, Reagent, ReagentMod, ReagentStructure, Sentence, Token,
    join_text,
};

fn noun_run_member(tok: &Token) -> bool {
    matches!(
        tok.pos(),
        Some(Pos::Dt | Pos::Jj | Pos::Nn | Pos::Nns | Pos::Cd)
    )
}

fn placeholder_reagent(tokens: &[Token]) -> Reagent {
    let text = join_text(tokens);
    let name_toks: Vec<&Token> = tokens
        .iter()
        .skip_while(|t| t.pos() == Some(Pos::Dt))
        .collect();
    let name = name_toks
        .iter()
        .map(|t| t.text())
        .collect::<Vec<_>>()
        .join(" ");
    Reagent {
        name: if name.is_empty() { text.clone() } else { name },
        quantities: Vec::new(),
        structure: ReagentStructure::Placeholder,
        text,
    }
}

/// Fold `<prep> <noun run>` leftovers into modifiers. "with"/"to"/"into"/
/// "in" keep their reagent-modifier meaning with a placeholder reagent;
/// every other preposition degrades to a details modifier.
fn fold_prep_phrases(sentence: &mut Sentence) {
    let tokens = &mut sentence.tokens;
    let mut i = 0;
    while i < tokens.len() {
        let is_prep = matches!(tokens[i].pos(), Some(Pos::In | Pos::To));
        if !is_prep {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < tokens.len() && noun_run_member(&tokens[j]) {
            j += 1;
        }
        if j == i + 1 {
            i += 1;
            continue;
        }
        let prep_text = tokens[i].text().to_ascii_lowercase();
        let text = join_text(&tokens[i..j]);
        let kind = match prep_text.as_str() {
            "with" => Some(Prep::With),
            "to" | "into" => Some(Prep::To),
            "in" => Some(Prep::In),
            _ => None,
        };
        let folded = match kind {
            Some(prep) => Token::Modifier(Modifier::new(
                ModifierKind::Reagent(ReagentMod {
                    reagents: vec![placeholder_reagent(&tokens[i + 1..j])],
                    prep,
                }),
                text,
            )),
            None => Token::Modifier(Modifier::new(ModifierKind::Details, text)),
        };
        tokens.splice(i..j, std::iter::once(folded));
        i += 1;
    }
}

/// Fold leftover noun runs ("the reaction mixture", "the combined organic
/// layers") into placeholder reagents so subject patterns can match them.
fn fold_noun_runs(sentence: &mut Sentence) {
    let tokens = &mut sentence.tokens;
    let mut i = 0;
    while i < tokens.len() {
        if !noun_run_member(&tokens[i]) {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < tokens.len() && noun_run_member(&tokens[j]) {
            j += 1;
        }
        // A bare determiner is not a phrase.
        let only_dt = tokens[i..j].iter().all(|t| t.pos() == Some(Pos::Dt));
        if only_dt {
            i = j;
            continue;
        }
        let reagent = placeholder_reagent(&tokens[i..j]);
        tokens.splice(i..j, std::iter::once(Token::Reagent(reagent)));
        i += 1;
    }
}

/// The wildcard pass. Runs after verb tagging so recognized verbs are
/// already out of reach.
pub fn tag_wildcards(sentence: &mut Sentence) {
    fold_prep_phrases(sentence);
    fold_noun_runs(sentence);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::entity::tag_entities;
    use crate::tag::modifier::tag_modifiers;
    use crate::tag::pos::tokenize_and_pos_tag;
    use crate::tag::quantity::tag_quantities;
    use crate::tag::verbs::tag_verbs;

    fn tag(text: &str) -> Sentence {
        let mut s = tokenize_and_pos_tag(text).remove(0);
        tag_quantities(&mut s);
        tag_entities(&mut s);
        tag_modifiers(&mut s);
        tag_verbs(&mut s);
        tag_wildcards(&mut s);
        s
    }

    #[test]
    fn subject_noun_run_becomes_placeholder() {
        let s = tag("the reaction mixture was stirred");
        match &s.tokens[0] {
            Token::Reagent(r) => {
                assert_eq!(r.structure, ReagentStructure::Placeholder);
                assert_eq!(r.name, "reaction mixture");
            }
            other => panic!("expected placeholder reagent, got {other:?}"),
        }
    }

    #[test]
    fn unknown_prep_phrase_becomes_details() {
        let s = tag("heated on a steam bath");
        assert!(s
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Modifier(m) if m.kind == ModifierKind::Details)));
    }

    #[test]
    fn with_unknown_noun_keeps_reagent_meaning() {
        let s = tag("washed with cold permanganate solution");
        assert!(s.tokens.iter().any(|t| matches!(
            t,
            Token::Modifier(m) if matches!(&m.kind, ModifierKind::Reagent(rm) if rm.prep == Prep::With)
        )));
    }
}
