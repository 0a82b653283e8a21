use thiserror::Error;

use crate::automaton::StateId;

/// Violations of the contract between the translation stage and the back end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// The valuation space does not fit one guard word. Fatal for the run.
    #[error("{count} atomic propositions exceed the {max}-bit valuation word")]
    TooManyPropositions { count: usize, max: usize },
    #[error("duplicate atomic proposition '{0}'")]
    DuplicateProposition(String),
    #[error("transition {transition} of state {state} targets missing state {to}")]
    DanglingTransition {
        state: StateId,
        transition: usize,
        to: StateId,
    },
    #[error(
        "guard of transition {transition} of state {state} uses bit {bit}, \
         but only {count} propositions are declared"
    )]
    GuardOutOfRange {
        state: StateId,
        transition: usize,
        bit: u32,
        count: usize,
    },
    #[error("automaton has no initial state (id -1)")]
    MissingInitialState,
    #[error("automaton has {0} initial states (id -1), expected exactly one")]
    MultipleInitialStates(usize),
    #[error("automaton has {0} accepting wells (id 0), expected at most one")]
    MultipleAcceptingWells(usize),
    #[error("accepting well (state {0}) must be an always-true self-loop")]
    MalformedAcceptingWell(StateId),
    #[error("states {first} and {second} share id {id} and final marker {final_marker}")]
    DuplicateStateName {
        first: StateId,
        second: StateId,
        id: i32,
        final_marker: i32,
    },
}
