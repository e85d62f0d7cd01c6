//! Action extraction: combined verb phrases plus the generated pattern
//! grammar turn tagged sentences into an ordered action list, which the
//! disambiguation passes then repair in context.

pub mod combine;
pub mod disambiguate;
pub mod patterns;

use crate::tag::token::{Action, Sentence, Token};

pub use patterns::action_pattern_lengths;

/// Extract the ordered action list from tagged sentences.
pub fn extract(mut sentences: Vec<Sentence>) -> Vec<Action> {
    for s in &mut sentences {
        combine::combine(s);
        patterns::apply_action_patterns(s);
    }
    let mut actions: Vec<Action> = sentences
        .into_iter()
        .flat_map(|s| s.tokens)
        .filter_map(|t| match t {
            Token::Action(a) => Some(a),
            _ => None,
        })
        .collect();
    disambiguate::disambiguate(&mut actions);
    tracing::debug!(actions = actions.len(), "extraction complete");
    actions
}
