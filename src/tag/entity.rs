//! Entity tagging: vessels, techniques, colors, suppliers and reagents.
//!
//! All phrase tables are built once and sorted by descending non-optional
//! length; that ordering is load-bearing ("separatory funnel" must fold
//! before a bare "funnel" rule could ever see it).

use once_cell::sync::Lazy;

use super::matcher::{FoldRule, Pat, apply_rules, apply_rules_to_fixpoint, sort_rules};
use super::token::{
    ColorToken, Pos, QuantityKind, Reagent, ReagentStructure, Sentence, Supplier, TechniqueKind,
    TechniqueToken, TokKind, Token, VesselToken, join_text,
};
use super::verbs::is_verb_word;

// =============================================================================
// VESSELS
// =============================================================================

const VESSEL_PHRASES: &[(&[&str], &str)] = &[
    (&["round-bottom", "flask"], "flask"),
    (&["round", "bottom", "flask"], "flask"),
    (&["round-bottomed", "flask"], "flask"),
    (&["three-necked", "flask"], "flask"),
    (&["reaction", "flask"], "reactor"),
    (&["reaction", "vessel"], "reactor"),
    (&["reactor"], "reactor"),
    (&["flask"], "flask"),
    (&["beaker"], "beaker"),
    (&["vial"], "vial"),
    (&["separatory", "funnel"], "separator"),
    (&["separating", "funnel"], "separator"),
    (&["addition", "funnel"], "addition_funnel"),
    (&["dropping", "funnel"], "addition_funnel"),
    (&["buchner", "funnel"], "filter"),
    (&["büchner", "funnel"], "filter"),
    (&["sintered", "funnel"], "filter"),
    (&["filter", "funnel"], "filter"),
    (&["rotary", "evaporator"], "rotavap"),
];

static VESSEL_RULES: Lazy<Vec<FoldRule>> = Lazy::new(|| {
    let mut rules = Vec::new();
    for &(phrase, canonical) in VESSEL_PHRASES {
        // Optional size and adjective: "a 250 mL round-bottom flask".
        let mut pattern = vec![
            Pat::opt(Pat::Quant(QuantityKind::Volume)),
            Pat::opt(Pat::Pos(Pos::Jj)),
        ];
        pattern.extend(phrase.iter().map(|w| Pat::Lit(w)));
        rules.push(FoldRule::new(pattern, move |toks| {
            Token::Vessel(VesselToken {
                canonical: canonical.to_string(),
                text: join_text(toks),
            })
        }));
    }
    sort_rules(&mut rules);
    rules
});

// =============================================================================
// TECHNIQUES
// =============================================================================

const TECHNIQUE_PHRASES: &[(&[&str], TechniqueKind)] = &[
    (&["suction", "filtration"], TechniqueKind::Filtration),
    (&["vacuum", "filtration"], TechniqueKind::Filtration),
    (&["filtration"], TechniqueKind::Filtration),
    (&["rotary", "evaporation"], TechniqueKind::Evaporation),
    (&["evaporation"], TechniqueKind::Evaporation),
    (&["reduced", "pressure"], TechniqueKind::Vacuum),
    (&["vacuum"], TechniqueKind::Vacuum),
    (&["in", "vacuo"], TechniqueKind::Vacuum),
    (&["distillation"], TechniqueKind::Distillation),
    (&["column", "chromatography"], TechniqueKind::Chromatography),
    (&["flash", "chromatography"], TechniqueKind::Chromatography),
    (&["chromatography"], TechniqueKind::Chromatography),
    (&["recrystallization"], TechniqueKind::Recrystallization),
    (&["recrystallisation"], TechniqueKind::Recrystallization),
    (&["reflux"], TechniqueKind::Reflux),
    (&["sonication"], TechniqueKind::Sonication),
];

static TECHNIQUE_RULES: Lazy<Vec<FoldRule>> = Lazy::new(|| {
    let mut rules = Vec::new();
    for &(phrase, kind) in TECHNIQUE_PHRASES {
        let pattern: Vec<Pat> = phrase.iter().map(|w| Pat::Lit(w)).collect();
        rules.push(FoldRule::new(pattern, move |toks| {
            Token::Technique(TechniqueToken { kind, text: join_text(toks) })
        }));
    }
    sort_rules(&mut rules);
    rules
});

// =============================================================================
// COLORS & SUPPLIERS
// =============================================================================

const COLOR_WORDS: &[&str] = &[
    "white", "yellow", "orange", "red", "brown", "black", "green", "blue", "purple",
    "colorless", "colourless",
];

static COLOR_RULES: Lazy<Vec<FoldRule>> = Lazy::new(|| {
    let mut rules = Vec::new();
    for &w in COLOR_WORDS {
        rules.push(FoldRule::new(
            vec![Pat::opt(Pat::Lit("pale")), Pat::opt(Pat::Lit("dark")), Pat::Lit(w)],
            |toks| Token::Color(ColorToken { text: join_text(toks) }),
        ));
    }
    sort_rules(&mut rules);
    rules
});

const SUPPLIER_PHRASES: &[&[&str]] = &[
    &["sigma-aldrich"],
    &["alfa", "aesar"],
    &["aldrich"],
    &["sigma"],
    &["fisher"],
    &["merck"],
    &["tci"],
    &["acros"],
    &["strem"],
    &["fluka"],
];

static SUPPLIER_RULES: Lazy<Vec<FoldRule>> = Lazy::new(|| {
    let mut rules = Vec::new();
    for &phrase in SUPPLIER_PHRASES {
        let pattern: Vec<Pat> = phrase.iter().map(|w| Pat::Lit(w)).collect();
        rules.push(FoldRule::new(pattern, |toks| {
            Token::Supplier(Supplier { name: join_text(toks) })
        }));
    }
    sort_rules(&mut rules);
    rules
});

// =============================================================================
// REAGENT LEXICON
// =============================================================================

/// Common chemicals recognized without a quantity anchor. Anything not
/// listed still folds when a quantity or of-phrase pins it down, and the
/// wildcard pass catches the rest.
const CHEMICAL_PHRASES: &[&[&str]] = &[
    &["water"],
    &["brine"],
    &["diethyl", "ether"],
    &["petroleum", "ether"],
    &["ether"],
    &["ethyl", "acetate"],
    &["dichloromethane"],
    &["dcm"],
    &["chloroform"],
    &["hexane"],
    &["hexanes"],
    &["pentane"],
    &["toluene"],
    &["benzene"],
    &["methanol"],
    &["ethanol"],
    &["isopropanol"],
    &["acetone"],
    &["acetonitrile"],
    &["thf"],
    &["tetrahydrofuran"],
    &["dmf"],
    &["dimethylformamide"],
    &["dmso"],
    &["sodium", "hydroxide"],
    &["potassium", "hydroxide"],
    &["sodium", "chloride"],
    &["sodium", "bicarbonate"],
    &["sodium", "carbonate"],
    &["sodium", "sulfate"],
    &["magnesium", "sulfate"],
    &["potassium", "carbonate"],
    &["hydrochloric", "acid"],
    &["sulfuric", "acid"],
    &["acetic", "acid"],
    &["ammonium", "chloride"],
    &["triethylamine"],
    &["pyridine"],
    &["celite"],
    &["silica", "gel"],
    &["silica"],
    &["charcoal"],
    &["nitrogen"],
    &["argon"],
    &["hydrogen"],
];

static CHEMICAL_RULES: Lazy<Vec<FoldRule>> = Lazy::new(|| {
    let mut rules = Vec::new();
    for &phrase in CHEMICAL_PHRASES {
        let mut pattern = vec![
            Pat::opt(Pat::Lit("saturated")),
            Pat::opt(Pat::Lit("aqueous")),
            Pat::opt(Pat::Lit("anhydrous")),
            Pat::opt(Pat::Lit("cold")),
            Pat::opt(Pat::Lit("hot")),
        ];
        pattern.extend(phrase.iter().map(|w| Pat::Lit(w)));
        rules.push(FoldRule::new(pattern, move |toks| {
            let text = join_text(toks);
            Token::Reagent(Reagent {
                name: text.clone(),
                quantities: Vec::new(),
                structure: ReagentStructure::Simple,
                text,
            })
        }));
    }
    sort_rules(&mut rules);
    rules
});

// =============================================================================
// REAGENT COMBINATION RULES
// =============================================================================

static REAGENT_COMBINE_RULES: Lazy<Vec<FoldRule>> = Lazy::new(|| {
    let mut rules: Vec<FoldRule> = Vec::new();

    // "<reagent> (5 g, 0.125 mol)" — attach a quantity group.
    rules.push(FoldRule::new(
        vec![Pat::Kind(TokKind::Reagent), Pat::Kind(TokKind::QuantityGroup)],
        |toks| {
            let (Token::Reagent(r), Token::QuantityGroup(g)) = (&toks[0], &toks[1]) else {
                unreachable!()
            };
            let mut r = r.clone();
            r.quantities.extend(g.quantities.iter().cloned());
            r.text = join_text(toks);
            Token::Reagent(r)
        },
    ));

    // "15 mL of dichloromethane" / "5 g of NaOH" — quantity-of phrase.
    for kind in [
        QuantityKind::Volume,
        QuantityKind::Mass,
        QuantityKind::Amount,
        QuantityKind::Equivalents,
    ] {
        rules.push(FoldRule::new(
            vec![Pat::Quant(kind), Pat::Lit("of"), Pat::Kind(TokKind::Reagent)],
            |toks| {
                let (Token::Quantity(q), Token::Reagent(r)) = (&toks[0], &toks[2]) else {
                    unreachable!()
                };
                let mut r = r.clone();
                r.quantities.insert(0, q.clone());
                r.text = join_text(toks);
                Token::Reagent(r)
            },
        ));
    }

    // "2 M hydrochloric acid" — concentration prefix.
    rules.push(FoldRule::new(
        vec![Pat::Quant(QuantityKind::Concentration), Pat::Kind(TokKind::Reagent)],
        |toks| {
            let (Token::Quantity(q), Token::Reagent(r)) = (&toks[0], &toks[1]) else {
                unreachable!()
            };
            let mut r = r.clone();
            r.quantities.insert(0, q.clone());
            r.name = format!("{} {}", q.text, r.name);
            r.text = join_text(toks);
            Token::Reagent(r)
        },
    ));

    // "(Aldrich)" after a reagent — note the supplier, keep the reagent.
    rules.push(FoldRule::new(
        vec![
            Pat::Kind(TokKind::Reagent),
            Pat::Pos(Pos::LParen),
            Pat::Kind(TokKind::Supplier),
            Pat::Pos(Pos::RParen),
        ],
        |toks| {
            let Token::Reagent(r) = &toks[0] else { unreachable!() };
            let mut r = r.clone();
            r.text = join_text(toks);
            Token::Reagent(r)
        },
    ));

    // "a solution of X in Y".
    rules.push(FoldRule::new(
        vec![
            Pat::opt(Pat::Pos(Pos::Dt)),
            Pat::Lit("solution"),
            Pat::Lit("of"),
            Pat::Kind(TokKind::Reagent),
            Pat::Lit("in"),
            Pat::Kind(TokKind::Reagent),
        ],
        |toks| {
            let reagents: Vec<&Reagent> = toks
                .iter()
                .filter_map(|t| match t {
                    Token::Reagent(r) => Some(r),
                    _ => None,
                })
                .collect();
            let (solute, solvent) = (reagents[0].clone(), reagents[1].clone());
            let solutes = match solute.structure {
                ReagentStructure::Group(rs) => rs,
                _ => vec![solute],
            };
            let text = join_text(toks);
            Token::Reagent(Reagent {
                name: text.clone(),
                quantities: Vec::new(),
                structure: ReagentStructure::Solution {
                    solutes,
                    solvent: Box::new(solvent),
                },
                text,
            })
        },
    ));

    // "a mixture of X and Y".
    rules.push(FoldRule::new(
        vec![
            Pat::opt(Pat::Pos(Pos::Dt)),
            Pat::Lit("mixture"),
            Pat::Lit("of"),
            Pat::Kind(TokKind::Reagent),
            Pat::Lit("and"),
            Pat::Kind(TokKind::Reagent),
        ],
        |toks| {
            let reagents: Vec<Reagent> = toks
                .iter()
                .filter_map(|t| match t {
                    Token::Reagent(r) => Some(r.clone()),
                    _ => None,
                })
                .collect();
            let text = join_text(toks);
            Token::Reagent(Reagent {
                name: text.clone(),
                quantities: Vec::new(),
                structure: ReagentStructure::Mixture(reagents),
                text,
            })
        },
    ));

    sort_rules(&mut rules);
    rules
});

fn group_reagents(a: &Reagent, b: &Reagent, text: String) -> Token {
    let mut members = match &a.structure {
        ReagentStructure::Group(rs) => rs.clone(),
        _ => vec![a.clone()],
    };
    match &b.structure {
        ReagentStructure::Group(rs) => members.extend(rs.iter().cloned()),
        _ => members.push(b.clone()),
    }
    Token::Reagent(Reagent {
        name: text.clone(),
        quantities: Vec::new(),
        structure: ReagentStructure::Group(members),
        text,
    })
}

// "X and Y" reagent runs fold to groups in their own fixpoint pass, after
// the structural rules above, so solution/mixture patterns see their parts
// first.
static REAGENT_GROUP_RULES: Lazy<Vec<FoldRule>> = Lazy::new(|| {
    vec![FoldRule::new(
        vec![
            Pat::Kind(TokKind::Reagent),
            Pat::Lit("and"),
            Pat::Kind(TokKind::Reagent),
        ],
        |toks| {
            let (Token::Reagent(a), Token::Reagent(b)) = (&toks[0], &toks[2]) else {
                unreachable!()
            };
            group_reagents(a, b, join_text(toks))
        },
    )]
});

/// "X, Y and Z" comma lists, folded outside the rule table so the fold can
/// look past its own window. A reagent pair split by a comma is only a list
/// when the right-hand reagent is not itself the sentence subject, as in
/// "To a solution of X in Y, Z was added" — there the comma separates a
/// prepositional prefix from the subject, and folding across it would
/// swallow the subject.
fn fold_comma_lists(sentence: &mut Sentence) {
    let tokens = &mut sentence.tokens;
    let mut i = 0;
    while i + 2 < tokens.len() {
        let comma_shape = tokens[i].kind() == TokKind::Reagent
            && tokens[i + 1].pos() == Some(Pos::Comma);
        let mut j = i + 2;
        // Oxford comma: "X, Y, and Z".
        if comma_shape && tokens[j].is_word("and") && j + 1 < tokens.len() {
            j += 1;
        }
        if !comma_shape || tokens[j].kind() != TokKind::Reagent {
            i += 1;
            continue;
        }
        let subject_next = tokens.get(j + 1).is_some_and(|t| {
            t.is_word("was")
                || t.is_word("were")
                || t.as_word().is_some_and(|w| is_verb_word(&w.text))
        });
        if subject_next {
            i += 1;
            continue;
        }
        let (Token::Reagent(a), Token::Reagent(b)) = (&tokens[i], &tokens[j]) else {
            unreachable!()
        };
        let folded = group_reagents(a, b, join_text(&tokens[i..=j]));
        tokens.splice(i..=j, std::iter::once(folded));
    }
}

// =============================================================================
// UNKNOWN-CHEMICAL RUNS
// =============================================================================

/// Nouns that name process artifacts rather than chemicals; they never open
/// a reagent run.
const NON_CHEMICAL_NOUNS: &[&str] = &[
    "mixture", "layer", "layers", "solution", "residue", "solid", "precipitate",
    "filtrate", "solvent", "product", "reaction", "crystals", "cake", "oil",
    "portion", "portions", "contents", "funnel", "flask", "temperature", "pressure",
    "bath", "time", "times", "stirring", "addition", "phase", "phases",
];

fn chem_run_candidate(tok: &Token) -> bool {
    let Some(w) = tok.as_word() else { return false };
    if !matches!(w.pos, Pos::Nn | Pos::Nns | Pos::Jj) {
        return false;
    }
    let lower = w.text.to_ascii_lowercase();
    !NON_CHEMICAL_NOUNS.contains(&lower.as_str()) && !is_verb_word(&lower)
}

/// Fold an unknown noun run directly followed by a quantity group:
/// "benzylamine hydrochloride (30 mg, 0.02 mol)".
fn fold_unknown_chemicals(sentence: &mut Sentence) {
    let tokens = &mut sentence.tokens;
    let mut i = 0;
    while i < tokens.len() {
        if !chem_run_candidate(&tokens[i]) {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < tokens.len() && chem_run_candidate(&tokens[j]) {
            j += 1;
        }
        if j < tokens.len() && tokens[j].kind() == TokKind::QuantityGroup {
            let name = join_text(&tokens[i..j]);
            let Token::QuantityGroup(g) = &tokens[j] else { unreachable!() };
            let quantities = g.quantities.clone();
            let text = join_text(&tokens[i..=j]);
            tokens.splice(
                i..=j,
                std::iter::once(Token::Reagent(Reagent {
                    name,
                    quantities,
                    structure: ReagentStructure::Simple,
                    text,
                })),
            );
        }
        i += 1;
    }
}

/// The entity tagging pass: vessels, techniques, colors, suppliers, then
/// reagent folding to fixpoint.
pub fn tag_entities(sentence: &mut Sentence) {
    apply_rules(sentence, &VESSEL_RULES);
    apply_rules(sentence, &TECHNIQUE_RULES);
    apply_rules(sentence, &COLOR_RULES);
    apply_rules(sentence, &SUPPLIER_RULES);
    apply_rules(sentence, &CHEMICAL_RULES);
    fold_unknown_chemicals(sentence);
    apply_rules_to_fixpoint(sentence, &REAGENT_COMBINE_RULES);
    apply_rules_to_fixpoint(sentence, &REAGENT_GROUP_RULES);
    fold_comma_lists(sentence);
    // Grouping can expose new solution/mixture shapes ("a solution of X and
    // Y in Z"), so run the structural rules once more.
    apply_rules_to_fixpoint(sentence, &REAGENT_COMBINE_RULES);
}
