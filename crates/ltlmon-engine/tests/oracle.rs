//! Property-based checks of the stutter analyzer against an explicit
//! reachability/cycle search.

use std::collections::VecDeque;

use proptest::prelude::*;

use ltlmon_engine::{analyze, compute_stutter_table};
use ltlmon_ir::proptest_generators::arb_automaton;
use ltlmon_ir::{Automaton, StateId, Valuation};

/// States reachable from `from` in one or more steps under `valuation`.
fn reachable_plus(ba: &Automaton, valuation: Valuation, from: StateId) -> Vec<bool> {
    let mut seen = vec![false; ba.count_states()];
    let mut queue: VecDeque<StateId> = ba.successors(from, valuation).collect();
    while let Some(s) = queue.pop_front() {
        if seen[s] {
            continue;
        }
        seen[s] = true;
        queue.extend(ba.successors(s, valuation));
    }
    seen
}

fn on_accepting_cycle(ba: &Automaton, valuation: Valuation, s: StateId) -> bool {
    ba.is_accepting_witness(s) && reachable_plus(ba, valuation, s)[s]
}

fn oracle(ba: &Automaton, valuation: Valuation, s: StateId) -> bool {
    if on_accepting_cycle(ba, valuation, s) {
        return true;
    }
    reachable_plus(ba, valuation, s)
        .iter()
        .enumerate()
        .any(|(f, reached)| *reached && on_accepting_cycle(ba, valuation, f))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn analyzer_matches_oracle(ba in arb_automaton()) {
        let table = compute_stutter_table(&ba).unwrap();
        prop_assert_eq!(table.n_valuations() as u64, ba.propositions.valuation_count());
        for valuation in ba.propositions.valuations() {
            for s in 0..ba.count_states() {
                prop_assert_eq!(
                    table.get(valuation, s),
                    oracle(&ba, valuation, s),
                    "valuation {} state {}\n{}",
                    valuation,
                    s,
                    ba
                );
            }
        }
    }

    #[test]
    fn analysis_is_deterministic(ba in arb_automaton()) {
        let first = analyze(&ba).unwrap();
        let second = analyze(&ba).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn structural_tables_follow_ids(ba in arb_automaton()) {
        let tables = analyze(&ba).unwrap();
        prop_assert_eq!(tables.surely_reject.len(), ba.count_states());
        prop_assert!(tables.surely_reject.iter().all(|r| !r));
        for (sid, state) in ba.states.iter().enumerate() {
            prop_assert_eq!(tables.surely_accept[sid], state.id == 0);
        }
    }

    #[test]
    fn accepting_well_is_stutter_accepting_everywhere(ba in arb_automaton()) {
        let tables = analyze(&ba).unwrap();
        if let Some(well) = ba.accepting_well() {
            for valuation in ba.propositions.valuations() {
                prop_assert!(tables.stutter.get(valuation, well));
            }
        }
    }
}
