//! Structural acceptance tables.
//!
//! Both tables assume the automaton is in reduced form, which is not checked:
//! only the accepting well accepts every suffix, and no state rejects every
//! suffix (it would have been removed upstream). On an automaton that is not
//! reduced the resulting verdicts are wrong, not fatal.

use ltlmon_ir::{Automaton, State, StateId, Valuation};

use crate::stutter::StutterTable;

/// `surely_accept[s]`: every word is accepted from `s`, whatever the suffix.
pub fn surely_accept(automaton: &Automaton) -> Vec<bool> {
    automaton
        .states
        .iter()
        .map(State::is_accepting_well)
        .collect()
}

/// `surely_reject[s]`: every word is rejected from `s`, whatever the suffix.
pub fn surely_reject(automaton: &Automaton) -> Vec<bool> {
    vec![false; automaton.count_states()]
}

/// Three-way outcome of the monitor's conclusion routine for one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    SureReject,
    SureAccept,
    /// Stuttering the last valuation forever is accepted.
    MaybeAccept,
    MaybeReject,
}

/// All tables the monitor emitter consumes, indexed by state label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceTables {
    pub surely_accept: Vec<bool>,
    pub surely_reject: Vec<bool>,
    pub stutter: StutterTable,
}

impl AcceptanceTables {
    /// Verdict for a trace ending in `state` with last valuation `valuation`.
    pub fn verdict(&self, state: StateId, valuation: Valuation) -> Verdict {
        if self.surely_reject[state] {
            Verdict::SureReject
        } else if self.surely_accept[state] {
            Verdict::SureAccept
        } else if self.stutter.get(valuation, state) {
            Verdict::MaybeAccept
        } else {
            Verdict::MaybeReject
        }
    }
}
