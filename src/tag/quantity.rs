//! Quantity tagging: fold `<number> <unit>` runs into typed quantities.
//!
//! Every unit family accepts all of its common spellings; matching is
//! longest-run-first (combined "25°C" forms, then two-word forms, then
//! single-word specials) so partial matches never shadow full ones.

use once_cell::sync::Lazy;
use regex::Regex;

use super::token::{
    Pos, Quantity, QuantityGroup, QuantityKind, Sentence, Token, join_text,
};

/// Spelling → (family, canonical unit). Lowercased lookup.
fn unit_family(word: &str) -> Option<(QuantityKind, &'static str)> {
    use QuantityKind::*;
    let w = word.to_ascii_lowercase();
    let hit = match w.as_str() {
        "ml" | "mls" | "cc" | "millilitre" | "millilitres" | "milliliter" | "milliliters" => {
            (Volume, "mL")
        }
        "l" | "litre" | "litres" | "liter" | "liters" => (Volume, "L"),
        "µl" | "ul" | "microlitre" | "microlitres" => (Volume, "µL"),
        "g" | "gram" | "grams" => (Mass, "g"),
        "mg" | "milligram" | "milligrams" => (Mass, "mg"),
        "kg" | "kilogram" | "kilograms" => (Mass, "kg"),
        "µg" | "ug" => (Mass, "µg"),
        "h" | "hr" | "hrs" | "hour" | "hours" => (Time, "h"),
        "min" | "mins" | "minute" | "minutes" => (Time, "min"),
        "s" | "sec" | "secs" | "second" | "seconds" => (Time, "s"),
        "day" | "days" => (Time, "days"),
        "°c" | "degc" | "celsius" => (Temperature, "°C"),
        "kelvin" => (Temperature, "K"),
        "mbar" | "millibar" => (Pressure, "mbar"),
        "bar" => (Pressure, "bar"),
        "atm" => (Pressure, "atm"),
        "torr" => (Pressure, "Torr"),
        "mmhg" => (Pressure, "mmHg"),
        "psi" => (Pressure, "psi"),
        "m" | "molar" => (Concentration, "M"),
        "%" | "wt%" => (Concentration, "%"),
        "mol" | "mole" | "moles" => (Amount, "mol"),
        "mmol" => (Amount, "mmol"),
        "µmol" | "umol" => (Amount, "µmol"),
        "rpm" => (StirSpeed, "rpm"),
        "cm" => (Length, "cm"),
        "mm" => (Length, "mm"),
        "mol%" => (MolPercent, "mol%"),
        "equiv" | "equiv." | "eq" | "eq." | "equivalent" | "equivalents" => {
            (Equivalents, "equiv")
        }
        _ => return None,
    };
    Some(hit)
}

fn parse_num(s: &str) -> Option<f64> {
    s.replace(',', "").parse().ok()
}

static COMBINED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)([^\d\s.].*)$").unwrap());
static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)[-–](\d+(?:\.\d+)?)$").unwrap());
static RATIO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d+)$").unwrap());
static MULT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[x×](\d+)|(\d+)[x×])$").unwrap());

fn quantity(kind: QuantityKind, value: Option<f64>, unit: &str, text: String) -> Token {
    Token::Quantity(Quantity {
        kind,
        value,
        upper: None,
        unit: unit.to_string(),
        text,
    })
}

/// Fold single-token forms: "25°C", "3x", "1:1", "overnight".
fn fold_single(tok: &Token) -> Option<Token> {
    let w = tok.as_word()?;
    let text = w.text.clone();

    if w.is("overnight") {
        return Some(quantity(QuantityKind::Time, Some(16.0), "h", text));
    }
    if let Some(c) = RATIO_RE.captures(&text) {
        let a: f64 = c[1].parse().ok()?;
        let b: f64 = c[2].parse().ok()?;
        return Some(quantity(QuantityKind::Ratio, Some(a / b), "ratio", text));
    }
    if let Some(c) = MULT_RE.captures(&text) {
        let n = c.get(1).or_else(|| c.get(2))?.as_str().parse().ok()?;
        return Some(quantity(QuantityKind::Multiplier, Some(n), "x", text));
    }
    if let Some(c) = COMBINED_RE.captures(&text) {
        let value = parse_num(&c[1]);
        if let Some((kind, unit)) = unit_family(&c[2]) {
            return Some(quantity(kind, value, unit, text));
        }
    }
    None
}

/// Fold `<number> <unit>` and `<range> <unit>` pairs, plus two-word specials.
fn fold_pairs(tokens: &mut Vec<Token>) {
    let mut i = 0;
    while i < tokens.len() {
        // "room temperature" / "ambient temperature"
        if i + 1 < tokens.len()
            && (tokens[i].is_word("room") || tokens[i].is_word("ambient"))
            && tokens[i + 1].is_word("temperature")
        {
            let text = join_text(&tokens[i..i + 2]);
            tokens.splice(
                i..i + 2,
                std::iter::once(quantity(QuantityKind::Temperature, None, "ambient", text)),
            );
            i += 1;
            continue;
        }

        let Some(w) = tokens[i].as_word().cloned() else {
            i += 1;
            continue;
        };

        // "8-18 hours" — range followed by unit
        if let Some(c) = RANGE_RE.captures(&w.text) {
            if let Some(next) = tokens.get(i + 1).and_then(|t| t.as_word()) {
                if let Some((kind, unit)) = unit_family(&next.text) {
                    let lo = parse_num(&c[1]);
                    let hi = parse_num(&c[2]);
                    let text = join_text(&tokens[i..i + 2]);
                    let q = Quantity {
                        kind,
                        value: lo,
                        upper: hi,
                        unit: unit.to_string(),
                        text,
                    };
                    tokens.splice(i..i + 2, std::iter::once(Token::Quantity(q)));
                    i += 1;
                    continue;
                }
            }
        }

        if w.pos == Pos::Cd {
            let value = parse_num(&w.text);
            // "<n> degrees [celsius]"
            if tokens.get(i + 1).is_some_and(|t| t.is_word("degrees") || t.is_word("deg")) {
                let end = if tokens.get(i + 2).is_some_and(|t| t.is_word("celsius") || t.is_word("c"))
                {
                    i + 3
                } else {
                    i + 2
                };
                let text = join_text(&tokens[i..end]);
                tokens.splice(
                    i..end,
                    std::iter::once(quantity(QuantityKind::Temperature, value, "°C", text)),
                );
                i += 1;
                continue;
            }
            // "<n> mol %" split across tokens
            if tokens.get(i + 1).is_some_and(|t| t.is_word("mol"))
                && tokens.get(i + 2).is_some_and(|t| t.is_word("%"))
            {
                let text = join_text(&tokens[i..i + 3]);
                tokens.splice(
                    i..i + 3,
                    std::iter::once(quantity(QuantityKind::MolPercent, value, "mol%", text)),
                );
                i += 1;
                continue;
            }
            // "<n> <unit>"
            if let Some(next) = tokens.get(i + 1).and_then(|t| t.as_word()) {
                if let Some((kind, unit)) = unit_family(&next.text) {
                    let text = join_text(&tokens[i..i + 2]);
                    tokens.splice(i..i + 2, std::iter::once(quantity(kind, value, unit, text)));
                    i += 1;
                    continue;
                }
            }
            // "<n> x" / "x <n>" multipliers with a space
            if tokens.get(i + 1).is_some_and(|t| t.is_word("x") || t.is_word("×") || t.is_word("times"))
            {
                let text = join_text(&tokens[i..i + 2]);
                tokens.splice(
                    i..i + 2,
                    std::iter::once(quantity(QuantityKind::Multiplier, value, "x", text)),
                );
                i += 1;
                continue;
            }
        }
        i += 1;
    }
}

/// Fold `( q [, q]* )` runs into `QuantityGroup` tokens.
fn fold_groups(tokens: &mut Vec<Token>) {
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].pos() != Some(Pos::LParen) {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        let mut quantities = Vec::new();
        let mut ok = false;
        while j < tokens.len() {
            match &tokens[j] {
                Token::Quantity(q) => {
                    quantities.push(q.clone());
                    j += 1;
                }
                t if t.pos() == Some(Pos::Comma) => j += 1,
                t if t.pos() == Some(Pos::RParen) => {
                    ok = !quantities.is_empty();
                    j += 1;
                    break;
                }
                _ => break,
            }
        }
        if ok {
            let text = join_text(&tokens[i..j]);
            tokens.splice(
                i..j,
                std::iter::once(Token::QuantityGroup(QuantityGroup { quantities, text })),
            );
        }
        i += 1;
    }
}

/// The quantity tagging pass.
pub fn tag_quantities(sentence: &mut Sentence) {
    for tok in sentence.tokens.iter_mut() {
        if let Some(folded) = fold_single(tok) {
            *tok = folded;
        }
    }
    fold_pairs(&mut sentence.tokens);
    fold_groups(&mut sentence.tokens);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::pos::tokenize_and_pos_tag;

    fn tag(text: &str) -> Sentence {
        let mut s = tokenize_and_pos_tag(text).remove(0);
        tag_quantities(&mut s);
        s
    }

    #[test]
    fn volume_spelling_variants() {
        for spelling in ["1 mL", "1 ml", "1 cc", "2 millilitres"] {
            let s = tag(spelling);
            assert_eq!(s.tokens.len(), 1, "{spelling}");
            match &s.tokens[0] {
                Token::Quantity(q) => {
                    assert_eq!(q.kind, QuantityKind::Volume, "{spelling}");
                    assert_eq!(q.unit, "mL", "{spelling}");
                }
                other => panic!("expected quantity for {spelling}, got {other:?}"),
            }
        }
    }

    #[test]
    fn combined_temperature() {
        let s = tag("cooled to 0°C");
        let q = s
            .tokens
            .iter()
            .find_map(|t| match t {
                Token::Quantity(q) => Some(q),
                _ => None,
            })
            .unwrap();
        assert_eq!(q.kind, QuantityKind::Temperature);
        assert_eq!(q.value, Some(0.0));
    }

    #[test]
    fn range_with_unit() {
        let s = tag("stirred for 8-18 hours");
        let q = s
            .tokens
            .iter()
            .find_map(|t| match t {
                Token::Quantity(q) => Some(q),
                _ => None,
            })
            .unwrap();
        assert_eq!(q.kind, QuantityKind::Time);
        assert_eq!(q.value, Some(8.0));
        assert_eq!(q.upper, Some(18.0));
    }

    #[test]
    fn parenthesized_group() {
        let s = tag("sodium hydroxide (5 g, 0.125 mol) was added");
        let g = s
            .tokens
            .iter()
            .find_map(|t| match t {
                Token::QuantityGroup(g) => Some(g),
                _ => None,
            })
            .unwrap();
        assert_eq!(g.quantities.len(), 2);
        assert_eq!(g.quantities[0].kind, QuantityKind::Mass);
        assert_eq!(g.quantities[1].kind, QuantityKind::Amount);
    }

    #[test]
    fn dotted_equivalents_in_a_group() {
        let s = tag("sodium hydride (5 g, 2 eq.) was added");
        let g = s
            .tokens
            .iter()
            .find_map(|t| match t {
                Token::QuantityGroup(g) => Some(g),
                _ => None,
            })
            .unwrap();
        assert_eq!(g.quantities.len(), 2);
        assert_eq!(g.quantities[1].kind, QuantityKind::Equivalents);
        assert_eq!(g.quantities[1].unit, "equiv");
    }

    #[test]
    fn ratio_and_multiplier() {
        let s = tag("washed with water 3 x");
        assert!(s.tokens.iter().any(
            |t| matches!(t, Token::Quantity(q) if q.kind == QuantityKind::Multiplier && q.value == Some(3.0))
        ));
        let s = tag("a 1:1 mixture");
        assert!(s
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Quantity(q) if q.kind == QuantityKind::Ratio)));
    }
}
