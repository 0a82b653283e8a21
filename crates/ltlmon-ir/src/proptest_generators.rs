//! Proptest strategies for generating well-formed `Automaton` instances.

use proptest::prelude::*;

use crate::automaton::{Automaton, ACCEPTING_WELL_ID, INITIAL_STATE_ID};
use crate::propositions::PropositionTable;
use crate::valuation::{Guard, Valuation};

/// Marker value used for accepting states in generated automata.
pub const GENERATED_ACCEPT_MARKER: i32 = 1;

/// Strategy for a valid `Automaton` suitable for property testing.
///
/// Generated automata have:
/// - 0–3 propositions named `p0`, `p1`, ...
/// - 1–7 states, exactly one of them initial
/// - optionally an accepting well (always-true self-loop) when there are 2+ states
/// - 0–3 transitions per ordinary state with arbitrary (possibly contradictory) guards
/// - random acceptance markers on ordinary states
pub fn arb_automaton() -> impl Strategy<Value = Automaton> {
    (0..=3usize, 1..=7usize, any::<bool>())
        .prop_flat_map(|(nprops, nstates, with_well)| {
            let mask: Valuation = (1 << nprops) - 1;
            let edges = proptest::collection::vec(
                proptest::collection::vec((0..nstates, 0..=mask, 0..=mask), 0..=3),
                nstates..=nstates,
            );
            let finals = proptest::collection::vec(any::<bool>(), nstates..=nstates);
            (
                Just(nprops),
                Just(with_well && nstates > 1),
                0..nstates,
                edges,
                finals,
            )
        })
        .prop_map(|(nprops, with_well, initial, edges, finals)| {
            let nstates = edges.len();
            let props = PropositionTable::new((0..nprops).map(|i| format!("p{i}")))
                .expect("generated proposition names are distinct");
            let mut ba = Automaton::new(props, GENERATED_ACCEPT_MARKER);
            let well = with_well.then_some((initial + 1) % nstates);

            let mut next_id = 1;
            for (sid, is_final) in finals.iter().enumerate() {
                let marker = if *is_final { GENERATED_ACCEPT_MARKER } else { 0 };
                if sid == initial {
                    ba.add_state(INITIAL_STATE_ID, marker);
                } else if Some(sid) == well {
                    ba.add_state(ACCEPTING_WELL_ID, marker);
                } else {
                    ba.add_state(next_id, marker);
                    next_id += 1;
                }
            }

            for (sid, out) in edges.into_iter().enumerate() {
                if Some(sid) == well {
                    ba.add_transition(sid, Guard::always(), sid);
                    continue;
                }
                for (to, pos, neg) in out {
                    ba.add_transition(sid, Guard::new(pos, neg), to);
                }
            }
            ba
        })
}
