//! Token type definitions for the tagging phases.
//!
//! The token stream starts as POS-tagged words and is progressively folded
//! into typed semantic units: quantities, vessels, reagents, modifiers and
//! verb phrases. Every typed variant stores the joined source text of the
//! run it replaced, so a sentence prints the same before and after folding.

use serde::{Deserialize, Serialize};

// =============================================================================
// WORDS & POS TAGS
// =============================================================================

/// Penn-style part-of-speech tag, reduced to the distinctions the pattern
/// tables actually consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pos {
    /// Cardinal number.
    Cd,
    /// Determiner ("the", "a").
    Dt,
    /// Preposition ("at", "in", "with", "under").
    In,
    /// Coordinating conjunction ("and", "or").
    Cc,
    /// "to".
    To,
    /// Adjective.
    Jj,
    /// Singular noun.
    Nn,
    /// Plural noun.
    Nns,
    /// Base-form verb.
    Vb,
    /// Past-tense verb.
    Vbd,
    /// Gerund.
    Vbg,
    /// Past participle.
    Vbn,
    /// Adverb.
    Rb,
    /// Pronoun ("which", "it").
    Prp,
    Comma,
    Period,
    LParen,
    RParen,
    /// Symbol or anything unclassified.
    Sym,
}

/// An atomic POS-tagged token. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub pos: Pos,
}

impl Word {
    pub fn new(text: impl Into<String>, pos: Pos) -> Self {
        Word { text: text.into(), pos }
    }

    pub fn is(&self, s: &str) -> bool {
        self.text.eq_ignore_ascii_case(s)
    }
}

// =============================================================================
// QUANTITIES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityKind {
    Volume,
    Mass,
    Time,
    Temperature,
    Pressure,
    Concentration,
    StirSpeed,
    Length,
    MolPercent,
    Equivalents,
    /// Molar amount ("0.02 mol").
    Amount,
    /// "1:1".
    Ratio,
    /// "3 x" / "x 3".
    Multiplier,
}

/// A recognized `<number> <unit>` run. `upper` is set for ranges
/// ("8-18 hours"). `value` is `None` for unit-less spellings such as
/// "room temperature" or "overnight".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub kind: QuantityKind,
    pub value: Option<f64>,
    pub upper: Option<f64>,
    /// Canonical unit spelling ("mL", "g", "h", "°C", ...).
    pub unit: String,
    /// Original source text.
    pub text: String,
}

impl Quantity {
    pub fn new(kind: QuantityKind, value: f64, unit: &str, text: impl Into<String>) -> Self {
        Quantity {
            kind,
            value: Some(value),
            upper: None,
            unit: unit.to_string(),
            text: text.into(),
        }
    }

    /// Per-portion scaling, renormalizing g→mg and L→mL below 1.
    pub fn scaled(&self, factor: f64) -> Quantity {
        let mut q = self.clone();
        if let Some(v) = q.value {
            let mut v = v * factor;
            let mut unit = q.unit.clone();
            if v < 1.0 {
                match unit.as_str() {
                    "g" => {
                        v *= 1000.0;
                        unit = "mg".into();
                    }
                    "L" => {
                        v *= 1000.0;
                        unit = "mL".into();
                    }
                    _ => {}
                }
            }
            q.value = Some(v);
            q.text = format!("{} {}", fmt_num(v), unit);
            q.unit = unit;
        }
        q
    }
}

pub(crate) fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{}", v)
    }
}

/// A parenthesized quantity cluster, e.g. `(30 mg, 0.02 mol)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityGroup {
    pub quantities: Vec<Quantity>,
    pub text: String,
}

// =============================================================================
// ENTITIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselToken {
    /// Canonical hardware role hint ("flask", "separator", "addition_funnel", ...).
    pub canonical: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorToken {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechniqueKind {
    Filtration,
    Evaporation,
    Distillation,
    Chromatography,
    Recrystallization,
    Drying,
    Vacuum,
    Reflux,
    Sonication,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueToken {
    pub kind: TechniqueKind,
    pub text: String,
}

// =============================================================================
// REAGENTS
// =============================================================================

/// Internal shape of a reagent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReagentStructure {
    /// A single named chemical.
    Simple,
    /// "X, Y and Z" — an enumerated reagent run.
    Group(Vec<Reagent>),
    /// "a solution of X in Y".
    Solution {
        solutes: Vec<Reagent>,
        solvent: Box<Reagent>,
    },
    /// "a mixture of X and Y".
    Mixture(Vec<Reagent>),
    /// Untyped noun run kept by the wildcard pass so later pattern matching
    /// stays clean.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reagent {
    /// Chemical name without quantities or articles.
    pub name: String,
    pub quantities: Vec<Quantity>,
    pub structure: ReagentStructure,
    pub text: String,
}

impl Reagent {
    pub fn simple(name: impl Into<String>) -> Self {
        let name = name.into();
        Reagent {
            text: name.clone(),
            name,
            quantities: Vec::new(),
            structure: ReagentStructure::Simple,
        }
    }

    pub fn quantity_of(&self, kind: QuantityKind) -> Option<&Quantity> {
        self.quantities.iter().find(|q| q.kind == kind)
    }

    /// Flatten groups/solutions/mixtures into the ordered list of constituent
    /// simple reagents. Solutions list solutes before the solvent.
    pub fn flatten(&self) -> Vec<Reagent> {
        match &self.structure {
            ReagentStructure::Simple | ReagentStructure::Placeholder => vec![self.clone()],
            ReagentStructure::Group(rs) | ReagentStructure::Mixture(rs) => {
                rs.iter().flat_map(|r| r.flatten()).collect()
            }
            ReagentStructure::Solution { solutes, solvent } => {
                let mut out: Vec<Reagent> = solutes.iter().flat_map(|r| r.flatten()).collect();
                out.extend(solvent.flatten());
                out
            }
        }
    }
}

// =============================================================================
// MODIFIERS
// =============================================================================

/// How a temperature was stated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TempSpec {
    Exact(f64),
    Range(f64, f64),
    RoomTemp,
    /// "bath temperature" and friends — displaced by any later exact value.
    Vague(String),
}

impl TempSpec {
    pub fn is_vague(&self) -> bool {
        matches!(self, TempSpec::Vague(_))
    }

    /// Midpoint in °C where one is derivable. Room temperature reads as 25.
    pub fn celsius(&self) -> Option<f64> {
        match self {
            TempSpec::Exact(t) => Some(*t),
            TempSpec::Range(a, b) => Some((a + b) / 2.0),
            TempSpec::RoomTemp => Some(25.0),
            TempSpec::Vague(_) => None,
        }
    }
}

/// Which preposition introduced a reagent modifier. Decides vessel-entry
/// order during add sanitization: `To`-reagents are already in the vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prep {
    To,
    With,
    In,
    Of,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReagentMod {
    pub reagents: Vec<Reagent>,
    pub prep: Prep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMod {
    pub quantity: Quantity,
    /// "every 5 min" rather than "for 5 min".
    pub interval: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdditionStyle {
    Dropwise,
    Slow,
    Portionwise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionSpec {
    pub style: Option<AdditionStyle>,
    pub n_portions: Option<u32>,
    /// "through celite" — filtration medium in the addition path.
    pub through: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirSpec {
    /// Rough rpm hint derived from adverbs ("vigorously").
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModifierKind {
    Temperature(TempSpec),
    Time(TimeMod),
    Reagent(ReagentMod),
    Stirring(StirSpec),
    Method(String),
    Technique(TechniqueKind),
    Addition(AdditionSpec),
    Repeat(u32),
    /// Catch-all prose kept for traceability; never consulted structurally.
    Details,
    Vessel(String),
    Atmosphere(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub text: String,
}

impl Modifier {
    pub fn new(kind: ModifierKind, text: impl Into<String>) -> Self {
        Modifier { kind, text: text.into() }
    }
}

// =============================================================================
// VERBS & ACTIONS
// =============================================================================

/// Closed set of recognized verb kinds; one sanitizer each, some redirecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerbKind {
    Add,
    Stir,
    Heat,
    Cool,
    Wash,
    Extract,
    Filter,
    Evaporate,
    Dry,
    Dissolve,
    Wait,
    Remove,
    Recrystallize,
    Discontinue,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tense {
    Past,
    Present,
}

/// A recognized verb occurrence plus the modifier run it governs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbPhrase {
    pub kind: VerbKind,
    pub text: String,
    pub tense: Tense,
    pub modifiers: Vec<Modifier>,
}

impl VerbPhrase {
    pub fn modifier(&self, pred: impl Fn(&ModifierKind) -> bool) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| pred(&m.kind))
    }

    pub fn has_temperature(&self) -> bool {
        self.modifier(|k| matches!(k, ModifierKind::Temperature(_))).is_some()
    }

    pub fn has_time(&self) -> bool {
        self.modifier(|k| matches!(k, ModifierKind::Time(_))).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Subject {
    Plain(String),
    Reagent(Reagent),
    Vessel(String),
}

impl Subject {
    pub fn text(&self) -> &str {
        match self {
            Subject::Plain(s) | Subject::Vessel(s) => s,
            Subject::Reagent(r) => &r.text,
        }
    }
}

/// One recognized verb occurrence in source text, with subject and modifiers.
/// Produced by pattern application in the extractor, consumed by exactly one
/// sanitizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub subject: Option<Subject>,
    pub verb: VerbPhrase,
    /// Original sentence span this action was extracted from.
    pub text: String,
    pub order_pos: usize,
}

// =============================================================================
// THE TOKEN STREAM
// =============================================================================

/// Category discriminant used by the pattern matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokKind {
    Word,
    Quantity,
    QuantityGroup,
    Vessel,
    Reagent,
    Supplier,
    Color,
    Technique,
    Verb,
    Modifier,
    Action,
}

/// Heterogeneous token: a sentence is a `Vec<Token>` rewritten in place by
/// each tagging pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    Word(Word),
    Quantity(Quantity),
    QuantityGroup(QuantityGroup),
    Vessel(VesselToken),
    Reagent(Reagent),
    Supplier(Supplier),
    Color(ColorToken),
    Technique(TechniqueToken),
    Verb(VerbPhrase),
    Modifier(Modifier),
    Action(Action),
}

impl Token {
    pub fn kind(&self) -> TokKind {
        match self {
            Token::Word(_) => TokKind::Word,
            Token::Quantity(_) => TokKind::Quantity,
            Token::QuantityGroup(_) => TokKind::QuantityGroup,
            Token::Vessel(_) => TokKind::Vessel,
            Token::Reagent(_) => TokKind::Reagent,
            Token::Supplier(_) => TokKind::Supplier,
            Token::Color(_) => TokKind::Color,
            Token::Technique(_) => TokKind::Technique,
            Token::Verb(_) => TokKind::Verb,
            Token::Modifier(_) => TokKind::Modifier,
            Token::Action(_) => TokKind::Action,
        }
    }

    /// Joined source text.
    pub fn text(&self) -> &str {
        match self {
            Token::Word(w) => &w.text,
            Token::Quantity(q) => &q.text,
            Token::QuantityGroup(g) => &g.text,
            Token::Vessel(v) => &v.text,
            Token::Reagent(r) => &r.text,
            Token::Supplier(s) => &s.name,
            Token::Color(c) => &c.text,
            Token::Technique(t) => &t.text,
            Token::Verb(v) => &v.text,
            Token::Modifier(m) => &m.text,
            Token::Action(a) => &a.text,
        }
    }

    pub fn as_word(&self) -> Option<&Word> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }

    /// Case-insensitive literal match against a plain word token.
    pub fn is_word(&self, s: &str) -> bool {
        matches!(self, Token::Word(w) if w.is(s))
    }

    pub fn pos(&self) -> Option<Pos> {
        self.as_word().map(|w| w.pos)
    }
}

/// One POS-tagged, progressively-folded sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

/// Join token texts the way the source read.
pub fn join_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for t in tokens {
        let s = t.text();
        if !out.is_empty() && !matches!(s, "," | "." | ")" | ":" | ";") {
            out.push(' ');
        }
        out.push_str(s);
    }
    out
}
