//! A compiler from written chemical procedures to executable step lists.
//!
//! The pipeline has five phases, each a module:
//!
//! 1. [`tag`] — tokenize prose and fold it into typed tokens.
//! 2. [`extract`] — pattern-match tagged sentences into actions.
//! 3. [`sanitize`] — per-verb normalization into typed action shapes.
//! 4. [`convert`] — actions into the flat step IR.
//! 5. [`resolve`] — fill every vessel slot and insert transfers.
//!
//! Free-text interpretation degrades instead of failing: unrecognized
//! prose drops out of the action list. The only hard errors are structural
//! misuses of the resolver, reported as [`CompilerError`].

pub mod convert;
pub mod error;
pub mod extract;
pub mod ir;
pub mod resolve;
pub mod sanitize;
pub mod tag;

pub use error::{CompilerError, Phase, ResolveError};
pub use ir::Step;
pub use resolve::{ForcedDirective, ForcedVessel};
pub use tag::token::Action;

/// Interpret procedure text into the ordered, disambiguated action list.
pub fn interpret(text: &str) -> Vec<Action> {
    extract::extract(tag::tag(text))
}

/// Compile procedure text all the way to a resolved step list.
pub fn compile(text: &str) -> Result<Vec<Step>, CompilerError> {
    let actions = interpret(text);
    let sanitized = sanitize::sanitize_all(&actions);
    let mut steps = convert::convert(&sanitized);
    resolve::resolve(&mut steps, &[])?;
    Ok(steps)
}
