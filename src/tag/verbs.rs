//! Action-word tagging: past/present-tense verb recognition plus the fixed
//! "discontinue" vocabulary.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::token::{Sentence, Tense, Token, VerbKind, VerbPhrase};

struct VerbEntry {
    kind: VerbKind,
    tense: Tense,
}

fn entry(kind: VerbKind, tense: Tense) -> VerbEntry {
    VerbEntry { kind, tense }
}

static VERB_TABLE: Lazy<HashMap<&'static str, VerbEntry>> = Lazy::new(|| {
    use Tense::*;
    use VerbKind::*;
    let mut m = HashMap::new();
    let mut both = |past: &'static str, present: &'static str, kind: VerbKind| {
        m.insert(past, entry(kind, Past));
        m.insert(present, entry(kind, Present));
    };
    both("added", "add", Add);
    both("charged", "charge", Add);
    both("introduced", "introduce", Add);
    both("poured", "pour", Add);
    both("stirred", "stir", Stir);
    both("agitated", "agitate", Stir);
    both("heated", "heat", Heat);
    both("warmed", "warm", Heat);
    both("refluxed", "reflux", Heat);
    both("cooled", "cool", Cool);
    both("chilled", "chill", Cool);
    both("washed", "wash", Wash);
    both("extracted", "extract", Extract);
    both("filtered", "filter", Filter);
    both("evaporated", "evaporate", Evaporate);
    both("concentrated", "concentrate", Evaporate);
    both("dried", "dry", Dry);
    both("dissolved", "dissolve", Dissolve);
    both("diluted", "dilute", Add);
    both("quenched", "quench", Add);
    both("removed", "remove", Remove);
    both("recrystallized", "recrystallize", Recrystallize);
    both("recrystallised", "recrystallise", Recrystallize);
    m.insert("stood", entry(Wait, Past));
    m.insert("stand", entry(Wait, Present));
    m.insert("left", entry(Wait, Past));
    m.insert("kept", entry(Wait, Past));
    // Discontinue vocabulary
    for w in ["discontinued", "stopped", "ceased", "halted"] {
        m.insert(w, entry(Discontinue, Past));
    }
    m
});

/// True if the word belongs to the verb vocabulary — consulted by the
/// entity pass so base-form verbs never get swallowed into reagent runs.
pub fn is_verb_word(word: &str) -> bool {
    VERB_TABLE.contains_key(word.to_ascii_lowercase().as_str())
}

/// The action-word tagging pass: rewrite recognized verbs into bare
/// `VerbPhrase` tokens (modifiers attach during combination).
pub fn tag_verbs(sentence: &mut Sentence) {
    use super::token::Pos;
    for i in 0..sentence.tokens.len() {
        let Some(w) = sentence.tokens[i].as_word().cloned() else {
            continue;
        };
        let lower = w.text.to_ascii_lowercase();
        let Some(e) = VERB_TABLE.get(lower.as_str()) else {
            continue;
        };
        // Adjective-tagged homographs ("dry ether") stay adjectives unless
        // they open an imperative clause ("Dry the solid").
        if w.pos == Pos::Jj {
            let imperative =
                i == 0 && sentence.tokens.get(1).is_some_and(|t| t.pos() == Some(Pos::Dt));
            if !imperative {
                continue;
            }
        }
        sentence.tokens[i] = Token::Verb(VerbPhrase {
            kind: e.kind,
            text: w.text,
            tense: e.tense,
            modifiers: Vec::new(),
        });
    }
}
