//! Modifier tagging: fold typed units and surrounding function words into
//! `Modifier` tokens attached later to action verbs.
//!
//! The table is generated at initialization and sorted by descending
//! non-optional length; among equal lengths the specific rules are inserted
//! first and the sort is stable, so "with stirring" can never lose to the
//! generic "with <reagent>" shape.

use once_cell::sync::Lazy;

use super::matcher::{FoldRule, Pat, apply_rules, sort_rules};
use super::token::{
    AdditionSpec, AdditionStyle, Modifier, ModifierKind, Pos, Prep, Quantity, QuantityKind,
    Reagent, ReagentMod, ReagentStructure, Sentence, StirSpec, TempSpec, TimeMod, TokKind, Token,
    join_text,
};

fn first_quantity(toks: &[Token]) -> &Quantity {
    toks.iter()
        .find_map(|t| match t {
            Token::Quantity(q) => Some(q),
            _ => None,
        })
        .expect("pattern guarantees a quantity")
}

fn first_reagent(toks: &[Token]) -> &Reagent {
    toks.iter()
        .find_map(|t| match t {
            Token::Reagent(r) => Some(r),
            _ => None,
        })
        .expect("pattern guarantees a reagent")
}

fn temp_spec(q: &Quantity) -> TempSpec {
    if q.unit == "ambient" {
        TempSpec::RoomTemp
    } else if let (Some(lo), Some(hi)) = (q.value, q.upper) {
        TempSpec::Range(lo, hi)
    } else if let Some(v) = q.value {
        TempSpec::Exact(v)
    } else {
        TempSpec::Vague(q.text.clone())
    }
}

fn modifier(kind: ModifierKind, toks: &[Token]) -> Token {
    Token::Modifier(Modifier::new(kind, join_text(toks)))
}

fn reagent_mod(prep: Prep, toks: &[Token]) -> Token {
    let r = first_reagent(toks);
    let reagents = match &r.structure {
        ReagentStructure::Group(rs) => rs.clone(),
        _ => vec![r.clone()],
    };
    modifier(ModifierKind::Reagent(ReagentMod { reagents, prep }), toks)
}

const GASES: &[&str] = &["nitrogen", "argon", "hydrogen"];

const NUMBER_WORDS: &[(&str, u32)] = &[
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

fn word_number(toks: &[Token]) -> Option<u32> {
    toks.iter().find_map(|t| {
        let w = t.as_word()?;
        let lower = w.text.to_ascii_lowercase();
        if let Ok(n) = lower.parse::<u32>() {
            return Some(n);
        }
        NUMBER_WORDS
            .iter()
            .find(|(s, _)| *s == lower)
            .map(|(_, n)| *n)
    })
}

static MODIFIER_RULES: Lazy<Vec<FoldRule>> = Lazy::new(|| {
    let mut rules: Vec<FoldRule> = Vec::new();
    let mut rule =
        |pattern: Vec<Pat>, build: Box<dyn Fn(&[Token]) -> Token + Send + Sync>| {
            rules.push(FoldRule { pattern, build });
        };

    // --- temperature ---
    for prep in ["at", "to"] {
        rule(
            vec![Pat::Lit(prep), Pat::Quant(QuantityKind::Temperature)],
            Box::new(|t| modifier(ModifierKind::Temperature(temp_spec(first_quantity(t))), t)),
        );
    }
    rule(
        vec![Pat::Lit("at"), Pat::Lit("bath"), Pat::Lit("temperature")],
        Box::new(|t| {
            modifier(
                ModifierKind::Temperature(TempSpec::Vague("bath temperature".into())),
                t,
            )
        }),
    );
    rule(
        vec![Pat::Quant(QuantityKind::Temperature)],
        Box::new(|t| modifier(ModifierKind::Temperature(temp_spec(first_quantity(t))), t)),
    );

    // --- time ---
    rule(
        vec![Pat::Lit("for"), Pat::opt(Pat::Lit("a")), Pat::opt(Pat::Lit("further")), Pat::Quant(QuantityKind::Time)],
        Box::new(|t| {
            modifier(
                ModifierKind::Time(TimeMod { quantity: first_quantity(t).clone(), interval: false }),
                t,
            )
        }),
    );
    rule(
        vec![Pat::Lit("every"), Pat::Quant(QuantityKind::Time)],
        Box::new(|t| {
            modifier(
                ModifierKind::Time(TimeMod { quantity: first_quantity(t).clone(), interval: true }),
                t,
            )
        }),
    );
    rule(
        vec![
            Pat::Lit("over"),
            Pat::opt(Pat::Lit("a")),
            Pat::opt(Pat::Lit("period")),
            Pat::opt(Pat::Lit("of")),
            Pat::Quant(QuantityKind::Time),
        ],
        Box::new(|t| {
            modifier(
                ModifierKind::Time(TimeMod { quantity: first_quantity(t).clone(), interval: false }),
                t,
            )
        }),
    );
    rule(
        vec![Pat::Quant(QuantityKind::Time)],
        Box::new(|t| {
            modifier(
                ModifierKind::Time(TimeMod { quantity: first_quantity(t).clone(), interval: false }),
                t,
            )
        }),
    );

    // --- stirring ---
    rule(
        vec![Pat::Lit("with"), Pat::Lit("vigorous"), Pat::Lit("stirring")],
        Box::new(|t| modifier(ModifierKind::Stirring(StirSpec { speed: Some(600.0) }), t)),
    );
    rule(
        vec![Pat::Lit("with"), Pat::Lit("stirring")],
        Box::new(|t| modifier(ModifierKind::Stirring(StirSpec { speed: None }), t)),
    );
    rule(
        vec![Pat::Lit("vigorously")],
        Box::new(|t| modifier(ModifierKind::Stirring(StirSpec { speed: Some(600.0) }), t)),
    );
    rule(
        vec![Pat::Lit("at"), Pat::Quant(QuantityKind::StirSpeed)],
        Box::new(|t| {
            modifier(
                ModifierKind::Stirring(StirSpec { speed: first_quantity(t).value }),
                t,
            )
        }),
    );

    // --- addition style ---
    rule(
        vec![Pat::Lit("dropwise")],
        Box::new(|t| {
            modifier(
                ModifierKind::Addition(AdditionSpec {
                    style: Some(AdditionStyle::Dropwise),
                    n_portions: None,
                    through: None,
                }),
                t,
            )
        }),
    );
    rule(
        vec![Pat::Lit("slowly")],
        Box::new(|t| {
            modifier(
                ModifierKind::Addition(AdditionSpec {
                    style: Some(AdditionStyle::Slow),
                    n_portions: None,
                    through: None,
                }),
                t,
            )
        }),
    );
    rule(
        vec![Pat::Lit("portionwise")],
        Box::new(|t| {
            modifier(
                ModifierKind::Addition(AdditionSpec {
                    style: Some(AdditionStyle::Portionwise),
                    n_portions: None,
                    through: None,
                }),
                t,
            )
        }),
    );
    rule(
        vec![Pat::Lit("in"), Pat::Pos(Pos::Cd), Pat::Lit("portions")],
        Box::new(|t| {
            modifier(
                ModifierKind::Addition(AdditionSpec {
                    style: Some(AdditionStyle::Portionwise),
                    n_portions: word_number(t),
                    through: None,
                }),
                t,
            )
        }),
    );
    rule(
        vec![Pat::Lit("in"), Pat::Lit("portions")],
        Box::new(|t| {
            modifier(
                ModifierKind::Addition(AdditionSpec {
                    style: Some(AdditionStyle::Portionwise),
                    n_portions: None,
                    through: None,
                }),
                t,
            )
        }),
    );
    rule(
        vec![Pat::Lit("through"), Pat::Kind(TokKind::Reagent)],
        Box::new(|t| {
            modifier(
                ModifierKind::Addition(AdditionSpec {
                    style: None,
                    n_portions: None,
                    through: Some(first_reagent(t).name.clone()),
                }),
                t,
            )
        }),
    );

    // --- repeats ---
    rule(
        vec![Pat::Quant(QuantityKind::Multiplier)],
        Box::new(|t| {
            let n = first_quantity(t).value.unwrap_or(1.0) as u32;
            modifier(ModifierKind::Repeat(n), t)
        }),
    );
    rule(
        vec![Pat::Lit("twice")],
        Box::new(|t| modifier(ModifierKind::Repeat(2), t)),
    );
    rule(
        vec![Pat::Lit("thrice")],
        Box::new(|t| modifier(ModifierKind::Repeat(3), t)),
    );
    rule(
        vec![
            Pat::AnyOf(&[
                "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
            ]),
            Pat::Lit("times"),
        ],
        Box::new(|t| modifier(ModifierKind::Repeat(word_number(t).unwrap_or(1)), t)),
    );

    // --- atmosphere ("under nitrogen", "under an atmosphere of argon") ---
    rule(
        vec![
            Pat::Lit("under"),
            Pat::opt(Pat::Pos(Pos::Dt)),
            Pat::opt(Pat::Lit("atmosphere")),
            Pat::opt(Pat::Lit("of")),
            Pat::Kind(TokKind::Reagent),
        ],
        Box::new(|t| {
            let r = first_reagent(t);
            let lower = r.name.to_ascii_lowercase();
            if GASES.iter().any(|g| lower.contains(g)) {
                modifier(ModifierKind::Atmosphere(r.name.clone()), t)
            } else {
                modifier(ModifierKind::Details, t)
            }
        }),
    );

    // --- techniques / methods ---
    for prep in ["by", "via", "under", "at", "to"] {
        rule(
            vec![Pat::Lit(prep), Pat::Kind(TokKind::Technique)],
            Box::new(|t| {
                let Some(Token::Technique(tt)) =
                    t.iter().find(|x| x.kind() == TokKind::Technique)
                else {
                    unreachable!()
                };
                modifier(ModifierKind::Technique(tt.kind), t)
            }),
        );
    }
    rule(
        vec![Pat::Kind(TokKind::Technique)],
        Box::new(|t| {
            let Token::Technique(tt) = &t[0] else { unreachable!() };
            modifier(ModifierKind::Technique(tt.kind), t)
        }),
    );

    // --- vessels & reagents with prepositions ---
    for prep in ["in", "into", "to", "from"] {
        rule(
            vec![Pat::Lit(prep), Pat::opt(Pat::Pos(Pos::Dt)), Pat::Kind(TokKind::Vessel)],
            Box::new(|t| {
                let Some(Token::Vessel(v)) = t.iter().find(|x| x.kind() == TokKind::Vessel)
                else {
                    unreachable!()
                };
                modifier(ModifierKind::Vessel(v.canonical.clone()), t)
            }),
        );
    }
    rule(
        vec![Pat::Lit("to"), Pat::opt(Pat::Pos(Pos::Dt)), Pat::Kind(TokKind::Reagent)],
        Box::new(|t| reagent_mod(Prep::To, t)),
    );
    rule(
        vec![Pat::Lit("into"), Pat::opt(Pat::Pos(Pos::Dt)), Pat::Kind(TokKind::Reagent)],
        Box::new(|t| reagent_mod(Prep::To, t)),
    );
    rule(
        vec![Pat::Lit("with"), Pat::opt(Pat::Pos(Pos::Dt)), Pat::Kind(TokKind::Reagent)],
        Box::new(|t| reagent_mod(Prep::With, t)),
    );
    rule(
        vec![Pat::Lit("in"), Pat::opt(Pat::Pos(Pos::Dt)), Pat::Kind(TokKind::Reagent)],
        Box::new(|t| reagent_mod(Prep::In, t)),
    );
    rule(
        vec![Pat::Lit("over"), Pat::opt(Pat::Pos(Pos::Dt)), Pat::Kind(TokKind::Reagent)],
        Box::new(|t| reagent_mod(Prep::With, t)),
    );

    sort_rules(&mut rules);
    rules
});

/// The modifier tagging pass.
pub fn tag_modifiers(sentence: &mut Sentence) {
    apply_rules(sentence, &MODIFIER_RULES);
}

/// Exposed for the pattern-precedence regression test.
pub fn modifier_rule_lengths() -> Vec<usize> {
    MODIFIER_RULES
        .iter()
        .map(|r| super::matcher::non_optional_len(&r.pattern))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::entity::tag_entities;
    use crate::tag::pos::tokenize_and_pos_tag;
    use crate::tag::quantity::tag_quantities;

    fn tag(text: &str) -> Sentence {
        let mut s = tokenize_and_pos_tag(text).remove(0);
        tag_quantities(&mut s);
        tag_entities(&mut s);
        tag_modifiers(&mut s);
        s
    }

    fn modifiers(s: &Sentence) -> Vec<&Modifier> {
        s.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Modifier(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn temperature_and_time() {
        let s = tag("stirred at 0°C for 2 h");
        let mods = modifiers(&s);
        assert!(mods
            .iter()
            .any(|m| matches!(&m.kind, ModifierKind::Temperature(TempSpec::Exact(t)) if *t == 0.0)));
        assert!(mods
            .iter()
            .any(|m| matches!(&m.kind, ModifierKind::Time(tm) if tm.quantity.value == Some(2.0))));
    }

    #[test]
    fn with_stirring_beats_generic_with() {
        let s = tag("heated with stirring");
        let mods = modifiers(&s);
        assert!(mods
            .iter()
            .any(|m| matches!(&m.kind, ModifierKind::Stirring(_))));
    }

    #[test]
    fn atmosphere_vs_details() {
        let s = tag("stirred under nitrogen");
        assert!(modifiers(&s)
            .iter()
            .any(|m| matches!(&m.kind, ModifierKind::Atmosphere(a) if a.contains("nitrogen"))));
    }

    #[test]
    fn portions_with_count() {
        let s = tag("added in 10 portions");
        assert!(modifiers(&s).iter().any(|m| matches!(
            &m.kind,
            ModifierKind::Addition(a) if a.n_portions == Some(10)
        )));
    }

    #[test]
    fn room_temperature_modifier() {
        let s = tag("stirred at room temperature");
        assert!(modifiers(&s)
            .iter()
            .any(|m| matches!(&m.kind, ModifierKind::Temperature(TempSpec::RoomTemp))));
    }
}
