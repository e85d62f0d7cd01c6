//! Whole-list routing for consecutive separations.
//!
//! A run of washes and extractions shares the separator: the retained phase
//! stays put between them, and a discarded phase that a later separation
//! still needs is parked in a buffer flask rather than sent to waste. Which
//! phase goes where follows the (purpose, target layer, solvent layer)
//! sequence of the run; where a destination is ambiguous, the next
//! separation's required layer decides. This pass only sets routing flags;
//! the converter turns them into vessel pre-seeds.

use crate::ir::SeparationPurpose;

use super::action::{Layer, SanitizedAction, SeparateAction};

fn sep_at(action: &SanitizedAction) -> Option<&SeparateAction> {
    match action {
        SanitizedAction::Separate(s) => Some(s),
        _ => None,
    }
}

/// The phase a separation starts from: the named target, or the phase
/// opposite its own solvent.
fn required_layer(s: &SeparateAction) -> Option<Layer> {
    s.target_layer.or_else(|| s.solvent_layer.map(Layer::opposite))
}

/// The phase a separation keeps in the separator. A wash keeps the phase it
/// works; an extraction moves the product into its solvent's phase.
fn retained_layer(s: &SeparateAction) -> Option<Layer> {
    match s.purpose {
        SeparationPurpose::Wash => required_layer(s),
        SeparationPurpose::Extract => s
            .solvent_layer
            .or_else(|| s.target_layer.map(Layer::opposite)),
    }
}

fn discarded_layer(s: &SeparateAction) -> Option<Layer> {
    retained_layer(s).map(Layer::opposite)
}

/// Look-ahead: does the next separation work the phase this one discards?
/// Without layer information, fall back to purpose adjacency — a wash ahead
/// of an extraction discards the phase the extraction needs.
fn feeds_next(cur: &SeparateAction, next: &SeparateAction) -> bool {
    match (discarded_layer(cur), required_layer(next)) {
        (Some(discarded), Some(required)) => discarded == required,
        _ => {
            cur.purpose == SeparationPurpose::Wash
                && next.purpose == SeparationPurpose::Extract
        }
    }
}

/// Set routing flags over every maximal run of consecutive separations.
pub fn sanitize_separation_vessels(actions: &mut [SanitizedAction]) {
    let mut i = 0;
    while i < actions.len() {
        if sep_at(&actions[i]).is_none() {
            i += 1;
            continue;
        }
        let mut j = i;
        while j < actions.len() && sep_at(&actions[j]).is_some() {
            j += 1;
        }
        for k in i..j {
            let first = k == i;
            let last = k + 1 == j;
            let buffer = !last
                && matches!(
                    (sep_at(&actions[k]), sep_at(&actions[k + 1])),
                    (Some(cur), Some(next)) if feeds_next(cur, next)
                );
            let SanitizedAction::Separate(sep) = &mut actions[k] else {
                continue;
            };
            sep.from_separator = !first;
            sep.to_separator = !last;
            sep.waste_to_buffer = buffer;
        }
        i = j;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::action::{SeparateAction, Separation, StirAction};

    fn sep(purpose: SeparationPurpose) -> SanitizedAction {
        layered(purpose, None, None)
    }

    fn layered(
        purpose: SeparationPurpose,
        target: Option<Layer>,
        solvent: Option<Layer>,
    ) -> SanitizedAction {
        SanitizedAction::Separate(SeparateAction {
            purpose,
            separations: vec![Separation { solvent: None, volume: None, repeats: 1 }],
            target_layer: target,
            solvent_layer: solvent,
            from_separator: false,
            to_separator: false,
            waste_to_buffer: false,
        })
    }

    fn flags(a: &SanitizedAction) -> (bool, bool, bool) {
        let SanitizedAction::Separate(s) = a else { panic!() };
        (s.from_separator, s.to_separator, s.waste_to_buffer)
    }

    #[test]
    fn run_chains_through_separator() {
        let mut acts = vec![
            sep(SeparationPurpose::Extract),
            sep(SeparationPurpose::Wash),
            sep(SeparationPurpose::Wash),
        ];
        sanitize_separation_vessels(&mut acts);
        assert_eq!(flags(&acts[0]), (false, true, false));
        assert_eq!(flags(&acts[1]), (true, true, false));
        assert_eq!(flags(&acts[2]), (true, false, false));
    }

    #[test]
    fn wash_before_extraction_buffers_waste() {
        let mut acts = vec![sep(SeparationPurpose::Wash), sep(SeparationPurpose::Extract)];
        sanitize_separation_vessels(&mut acts);
        assert_eq!(flags(&acts[0]), (false, true, true));
        assert_eq!(flags(&acts[1]), (true, false, false));
    }

    #[test]
    fn discarded_layer_parked_when_next_needs_it() {
        // An aqueous wash with an organic solvent discards the organic
        // phase; the following wash works exactly that phase, so even a
        // wash-wash pair routes through the buffer.
        let mut acts = vec![
            layered(
                SeparationPurpose::Wash,
                Some(Layer::Aqueous),
                Some(Layer::Organic),
            ),
            layered(
                SeparationPurpose::Wash,
                Some(Layer::Organic),
                Some(Layer::Aqueous),
            ),
        ];
        sanitize_separation_vessels(&mut acts);
        assert_eq!(flags(&acts[0]), (false, true, true));
        assert_eq!(flags(&acts[1]), (true, false, false));
    }

    #[test]
    fn look_ahead_overrides_purpose_adjacency() {
        // The extraction pulls from the aqueous phase the wash retains, so
        // nothing needs parking despite the wash-extract pairing.
        let mut acts = vec![
            layered(
                SeparationPurpose::Wash,
                Some(Layer::Aqueous),
                Some(Layer::Organic),
            ),
            layered(SeparationPurpose::Extract, None, Some(Layer::Organic)),
        ];
        sanitize_separation_vessels(&mut acts);
        assert_eq!(flags(&acts[0]), (false, true, false));
        assert_eq!(flags(&acts[1]), (true, false, false));
    }

    #[test]
    fn runs_split_by_other_actions() {
        let mut acts = vec![
            sep(SeparationPurpose::Wash),
            SanitizedAction::Stir(StirAction { time: None, speed: None }),
            sep(SeparationPurpose::Wash),
        ];
        sanitize_separation_vessels(&mut acts);
        assert_eq!(flags(&acts[0]), (false, false, false));
        assert_eq!(flags(&acts[2]), (false, false, false));
    }
}
