//! Sanitization: from extracted actions to typed, verb-agnostic shapes.
//!
//! Per-action dispatch lives in [`verbs`]; the one pass that needs the whole
//! list at once (separation routing) lives in [`separation`].

pub mod action;
pub mod separation;
pub mod verbs;

pub use action::{
    AddAction, DissolveAction, DryAction, EvaporateAction, FilterAction, HeatChillAction,
    Layer, SanitizedAction, SeparateAction, Separation, StirAction, WaitAction,
    WashSolidAction,
};
pub use separation::sanitize_separation_vessels;
pub use verbs::sanitize;

use crate::tag::token::Action;

/// Sanitize an action list: per-verb dispatch, silently dropping actions
/// without an executable shape, then whole-list separation routing.
pub fn sanitize_all(actions: &[Action]) -> Vec<SanitizedAction> {
    let mut out: Vec<SanitizedAction> = actions.iter().filter_map(sanitize).collect();
    sanitize_separation_vessels(&mut out);
    tracing::debug!(
        extracted = actions.len(),
        sanitized = out.len(),
        "sanitization complete"
    );
    out
}
