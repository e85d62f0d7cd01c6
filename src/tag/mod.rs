//! The tagging phase: raw procedure text in, typed token sentences out.
//!
//! Passes run in a fixed order, each rewriting the token stream in place:
//!
//! 1. [`pos`] — tokenize and POS-tag words.
//! 2. [`quantity`] — fold `<number> <unit>` runs into typed quantities.
//! 3. [`entity`] — vessels, techniques, suppliers, colors, reagents.
//! 4. [`modifier`] — prepositional phrases into action modifiers.
//! 5. [`verbs`] — recognized synthesis verbs.
//! 6. [`wildcard`] — fold everything still untyped into a safe shape.
//!
//! Quantities must precede entities (reagent rules consume quantity
//! groups); modifiers must precede verbs so verb homograph guards can see
//! what survived; the wildcard runs last by definition.

pub mod entity;
pub mod matcher;
pub mod modifier;
pub mod pos;
pub mod quantity;
pub mod token;
pub mod verbs;
pub mod wildcard;

pub use token::{
    Action, AdditionSpec, AdditionStyle, Modifier, ModifierKind, Pos, Prep, Quantity,
    QuantityGroup, QuantityKind, Reagent, ReagentMod, ReagentStructure, Sentence, StirSpec,
    Subject, TechniqueKind, TempSpec, Tense, TimeMod, TokKind, Token, VerbKind, VerbPhrase,
    Word,
};

/// Run the full tagging pipeline over raw procedure text.
pub fn tag(text: &str) -> Vec<Sentence> {
    let mut sentences = pos::tokenize_and_pos_tag(text);
    for s in &mut sentences {
        quantity::tag_quantities(s);
        entity::tag_entities(s);
        modifier::tag_modifiers(s);
        verbs::tag_verbs(s);
        wildcard::tag_wildcards(s);
    }
    tracing::debug!(sentences = sentences.len(), "tagging complete");
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_produces_typed_tokens() {
        let sentences = tag(
            "Sodium hydroxide (5 g, 0.125 mol) was added to the flask. \
             The mixture was stirred at 25°C for 2 h.",
        );
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0]
            .tokens
            .iter()
            .any(|t| t.kind() == TokKind::Verb));
        assert!(sentences[1]
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Modifier(m) if matches!(m.kind, ModifierKind::Time(_)))));
    }
}
