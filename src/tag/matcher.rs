//! Pattern-matching combinators over heterogeneous token streams.
//!
//! Every tagging pass is a table of `(pattern, fold)` rules applied
//! longest-non-optional-first over each sentence. Matching is greedy and
//! recursive: an `Opt` element is tried present-first. Tables are built once
//! at process initialization, sorted, and frozen behind `Lazy`.

use super::token::{Pos, QuantityKind, Sentence, TokKind, Token};

/// One pattern element.
#[derive(Debug, Clone)]
pub enum Pat {
    /// Case-insensitive literal word.
    Lit(&'static str),
    /// Any of several literal words.
    AnyOf(&'static [&'static str]),
    /// Any token of the given category.
    Kind(TokKind),
    /// A quantity token of a specific family.
    Quant(QuantityKind),
    /// A plain word with the given POS tag.
    Pos(Pos),
    /// Optional element.
    Opt(Box<Pat>),
}

impl Pat {
    pub fn opt(inner: Pat) -> Pat {
        Pat::Opt(Box::new(inner))
    }

    fn matches_one(&self, tok: &Token) -> bool {
        match self {
            Pat::Lit(s) => tok.is_word(s),
            Pat::AnyOf(ss) => ss.iter().any(|s| tok.is_word(s)),
            Pat::Kind(k) => tok.kind() == *k,
            Pat::Quant(q) => matches!(tok, Token::Quantity(qt) if qt.kind == *q),
            Pat::Pos(p) => tok.pos() == Some(*p),
            Pat::Opt(inner) => inner.matches_one(tok),
        }
    }
}

/// Number of non-optional elements — the sort key that keeps specific
/// phrases ahead of generic ones. Structural, not accidental list order.
pub fn non_optional_len(pattern: &[Pat]) -> usize {
    pattern.iter().filter(|p| !matches!(p, Pat::Opt(_))).count()
}

/// Try to match `pattern` at the head of `toks`. Returns the number of
/// tokens consumed.
pub fn match_at(pattern: &[Pat], toks: &[Token]) -> Option<usize> {
    let Some((first, rest)) = pattern.split_first() else {
        return Some(0);
    };
    if let Pat::Opt(inner) = first {
        if let Some(tok) = toks.first() {
            if inner.matches_one(tok) {
                if let Some(n) = match_at(rest, &toks[1..]) {
                    return Some(n + 1);
                }
            }
        }
        return match_at(rest, toks);
    }
    let tok = toks.first()?;
    if first.matches_one(tok) {
        match_at(rest, &toks[1..]).map(|n| n + 1)
    } else {
        None
    }
}

/// A fold rule: when `pattern` matches a token run, `build` replaces the run
/// with a single token.
pub struct FoldRule {
    pub pattern: Vec<Pat>,
    pub build: Box<dyn Fn(&[Token]) -> Token + Send + Sync>,
}

impl FoldRule {
    pub fn new(
        pattern: Vec<Pat>,
        build: impl Fn(&[Token]) -> Token + Send + Sync + 'static,
    ) -> Self {
        FoldRule { pattern, build: Box::new(build) }
    }
}

/// Sort a rule table by descending non-optional pattern length, so that a
/// pattern which is a token-subsequence of a longer one can never shadow it.
pub fn sort_rules(rules: &mut Vec<FoldRule>) {
    rules.sort_by(|a, b| non_optional_len(&b.pattern).cmp(&non_optional_len(&a.pattern)));
}

/// Apply a sorted rule table over one sentence, left to right. At each
/// position the first (therefore longest) matching rule folds; scanning
/// resumes after the folded token so adjacent runs still match.
pub fn apply_rules(sentence: &mut Sentence, rules: &[FoldRule]) {
    let mut i = 0;
    while i < sentence.tokens.len() {
        let mut advanced = false;
        for rule in rules {
            if let Some(n) = match_at(&rule.pattern, &sentence.tokens[i..]) {
                if n == 0 {
                    continue;
                }
                let folded = (rule.build)(&sentence.tokens[i..i + n]);
                sentence.tokens.splice(i..i + n, std::iter::once(folded));
                i += 1;
                advanced = true;
                break;
            }
        }
        if !advanced {
            i += 1;
        }
    }
}

/// Apply a rule table repeatedly until the sentence stops changing. Needed
/// by passes whose folds can enable further folds (reagent grouping).
pub fn apply_rules_to_fixpoint(sentence: &mut Sentence, rules: &[FoldRule]) {
    loop {
        let before = sentence.tokens.len();
        apply_rules(sentence, rules);
        if sentence.tokens.len() == before {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::token::Word;

    fn words(s: &str) -> Vec<Token> {
        s.split_whitespace()
            .map(|w| Token::Word(Word::new(w, Pos::Nn)))
            .collect()
    }

    #[test]
    fn literal_match_is_case_insensitive() {
        let toks = words("Round-bottom Flask");
        let pat = vec![Pat::Lit("round-bottom"), Pat::Lit("flask")];
        assert_eq!(match_at(&pat, &toks), Some(2));
    }

    #[test]
    fn optional_tried_present_first() {
        let toks = words("the big flask");
        let pat = vec![Pat::Lit("the"), Pat::opt(Pat::Lit("big")), Pat::Lit("flask")];
        assert_eq!(match_at(&pat, &toks), Some(3));
        let toks2 = words("the flask");
        assert_eq!(match_at(&pat, &toks2), Some(2));
    }

    #[test]
    fn sort_puts_longer_patterns_first() {
        let mut rules = vec![
            FoldRule::new(vec![Pat::Lit("flask")], |t| t[0].clone()),
            FoldRule::new(vec![Pat::Lit("round-bottom"), Pat::Lit("flask")], |t| {
                t[0].clone()
            }),
        ];
        sort_rules(&mut rules);
        assert_eq!(non_optional_len(&rules[0].pattern), 2);
    }
}
