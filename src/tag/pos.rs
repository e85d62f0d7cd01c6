//! Tokenization and part-of-speech tagging.
//!
//! This is the primitive capability the rest of the pipeline builds on. It
//! is deliberately simple: a closed function-word lexicon plus suffix
//! heuristics. The downstream tables only rely on a handful of distinctions
//! (number vs word, preposition vs noun, past-tense verb vs noun), so a full
//! statistical tagger would buy nothing here. Determinism is the contract.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::token::{Pos, Sentence, Token, Word};

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(,\d{3})*(\.\d+)?$|^\d+(\.\d+)?$").unwrap());

static LEXICON: Lazy<HashMap<&'static str, Pos>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for w in ["the", "a", "an", "this", "that", "each", "no"] {
        m.insert(w, Pos::Dt);
    }
    for w in [
        "at", "in", "with", "under", "over", "for", "by", "via", "from", "into", "on",
        "through", "of", "during", "after", "before", "until", "between", "using", "every",
    ] {
        m.insert(w, Pos::In);
    }
    for w in ["and", "or", "then"] {
        m.insert(w, Pos::Cc);
    }
    m.insert("to", Pos::To);
    for w in ["was", "were"] {
        m.insert(w, Pos::Vbd);
    }
    for w in ["is", "are", "be"] {
        m.insert(w, Pos::Vb);
    }
    m.insert("been", Pos::Vbn);
    for w in ["which", "it"] {
        m.insert(w, Pos::Prp);
    }
    for w in [
        "slowly", "dropwise", "portionwise", "vigorously", "gently", "carefully",
        "rapidly", "successively", "thoroughly", "gradually", "subsequently",
    ] {
        m.insert(w, Pos::Rb);
    }
    for w in [
        "aqueous", "organic", "combined", "saturated", "concentrated", "anhydrous",
        "dry", "cold", "hot", "fresh", "crude", "resulting", "remaining",
    ] {
        m.insert(w, Pos::Jj);
    }
    m
});

fn tag_word(text: &str) -> Pos {
    match text {
        "," => return Pos::Comma,
        "." => return Pos::Period,
        "(" => return Pos::LParen,
        ")" => return Pos::RParen,
        _ => {}
    }
    let lower = text.to_ascii_lowercase();
    if let Some(&pos) = LEXICON.get(lower.as_str()) {
        return pos;
    }
    if NUMBER_RE.is_match(text) {
        return Pos::Cd;
    }
    if !text.chars().next().is_some_and(|c| c.is_alphanumeric()) {
        return Pos::Sym;
    }
    if lower.ends_with("ing") && lower.len() > 4 {
        Pos::Vbg
    } else if lower.ends_with("ed") && lower.len() > 3 {
        Pos::Vbd
    } else if lower.ends_with('s') && !lower.ends_with("ss") && lower.len() > 3 {
        Pos::Nns
    } else if lower.ends_with("ly") && lower.len() > 3 {
        Pos::Rb
    } else {
        Pos::Nn
    }
}

/// Dotted spellings whose period belongs to the word, not the sentence.
/// Compared against the text left of the period, lowercased.
const DOTTED_ABBREVIATIONS: &[&str] = &["eq", "equiv", "approx", "ca"];

/// Split raw text into words, peeling punctuation into separate tokens.
fn split_words(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.split_whitespace() {
        let mut rest = raw;
        let mut lead = Vec::new();
        let mut trail = Vec::new();
        while let Some(r) = rest.strip_prefix('(') {
            lead.push("(".to_string());
            rest = r;
        }
        loop {
            if let Some(r) = rest.strip_suffix(')') {
                trail.push(")".to_string());
                rest = r;
            } else if let Some(r) = rest.strip_suffix(',') {
                trail.push(",".to_string());
                rest = r;
            } else if let Some(r) = rest.strip_suffix('.') {
                // Decimals ("0.125") and dotted unit abbreviations ("2 eq.")
                // keep their period; anything else ends the sentence.
                if r.chars().all(|c| c.is_ascii_digit())
                    || DOTTED_ABBREVIATIONS.contains(&r.to_ascii_lowercase().as_str())
                {
                    break;
                }
                trail.push(".".to_string());
                rest = r;
            } else if let Some(r) = rest.strip_suffix(';') {
                trail.push(".".to_string());
                rest = r;
            } else {
                break;
            }
        }
        out.extend(lead);
        if !rest.is_empty() {
            out.push(rest.to_string());
        }
        out.extend(trail.into_iter().rev());
    }
    out
}

/// Tokenize raw procedure text into POS-tagged sentences.
///
/// Sentences split on period tokens; the period itself is dropped so the
/// pattern tables never have to mention it.
pub fn tokenize_and_pos_tag(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for word in split_words(text) {
        if word == "." {
            if !current.is_empty() {
                sentences.push(Sentence { tokens: std::mem::take(&mut current) });
            }
            continue;
        }
        let pos = tag_word(&word);
        current.push(Token::Word(Word::new(word, pos)));
    }
    if !current.is_empty() {
        sentences.push(Sentence { tokens: current });
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sentences_on_periods() {
        let s = tokenize_and_pos_tag("The mixture was stirred. The solvent was removed.");
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].tokens.len(), 4);
    }

    #[test]
    fn peels_punctuation() {
        let s = tokenize_and_pos_tag("sodium hydroxide (5 g, 0.125 mol) was added");
        let texts: Vec<&str> = s[0].tokens.iter().map(|t| t.text()).collect();
        assert!(texts.contains(&"("));
        assert!(texts.contains(&","));
        assert!(texts.contains(&")"));
        assert!(texts.contains(&"0.125"));
    }

    #[test]
    fn dotted_abbreviations_do_not_end_the_sentence() {
        let s = tokenize_and_pos_tag("Sodium hydride (5 g, 2 eq.) was added to the flask.");
        assert_eq!(s.len(), 1, "sentence split inside the parenthesis: {s:?}");
        let texts: Vec<&str> = s[0].tokens.iter().map(|t| t.text()).collect();
        assert!(texts.contains(&"eq."), "tokens: {texts:?}");
        assert!(texts.contains(&")"));
    }

    #[test]
    fn tags_past_tense_and_numbers() {
        let s = tokenize_and_pos_tag("stirred at 25");
        assert_eq!(s[0].tokens[0].pos(), Some(Pos::Vbd));
        assert_eq!(s[0].tokens[2].pos(), Some(Pos::Cd));
    }
}
