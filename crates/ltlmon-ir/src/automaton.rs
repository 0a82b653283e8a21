use std::collections::HashMap;
use std::fmt;

use crate::errors::IrError;
use crate::propositions::PropositionTable;
use crate::valuation::{Guard, Valuation};

/// Dense index of a state in [`Automaton::states`]. Emitters use it as the label.
pub type StateId = usize;

/// Translation-stage id of the unique initial state.
pub const INITIAL_STATE_ID: i32 = -1;
/// Translation-stage id of the absorbing accepting state.
pub const ACCEPTING_WELL_ID: i32 = 0;

/// A guarded edge. Transitions never own their destination.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub guard: Guard,
    pub to: StateId,
}

impl Transition {
    pub fn is_satisfied(&self, valuation: Valuation) -> bool {
        self.guard.is_satisfied(valuation)
    }
}

/// A state of the Büchi automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    /// Id assigned by the translation stage (`-1` initial, `0` accepting well).
    pub id: i32,
    /// Acceptance marker, compared against [`Automaton::accept_marker`].
    pub final_marker: i32,
    /// Outgoing transitions in iteration order.
    pub transitions: Vec<Transition>,
}

impl State {
    pub fn is_initial(&self) -> bool {
        self.id == INITIAL_STATE_ID
    }

    pub fn is_accepting_well(&self) -> bool {
        self.id == ACCEPTING_WELL_ID
    }
}

/// Frozen Büchi automaton handed over by the translation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Automaton {
    pub propositions: PropositionTable,
    /// Marker value identifying accepting states.
    pub accept_marker: i32,
    pub states: Vec<State>,
}

impl Automaton {
    pub fn new(propositions: PropositionTable, accept_marker: i32) -> Self {
        Self {
            propositions,
            accept_marker,
            states: Vec::new(),
        }
    }

    pub fn add_state(&mut self, id: i32, final_marker: i32) -> StateId {
        let sid = self.states.len();
        self.states.push(State {
            id,
            final_marker,
            transitions: Vec::new(),
        });
        sid
    }

    pub fn add_transition(&mut self, from: StateId, guard: Guard, to: StateId) {
        self.states[from].transitions.push(Transition { guard, to });
    }

    pub fn count_states(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn initial_state(&self) -> Option<StateId> {
        self.states.iter().position(State::is_initial)
    }

    pub fn accepting_well(&self) -> Option<StateId> {
        self.states.iter().position(State::is_accepting_well)
    }

    /// Whether a cycle through this state witnesses acceptance.
    pub fn is_accepting_witness(&self, state: StateId) -> bool {
        let s = &self.states[state];
        s.final_marker == self.accept_marker || s.is_accepting_well()
    }

    /// Destinations of the transitions of `state` enabled under `valuation`.
    pub fn successors(
        &self,
        state: StateId,
        valuation: Valuation,
    ) -> impl Iterator<Item = StateId> + '_ {
        self.states[state]
            .transitions
            .iter()
            .filter(move |t| t.is_satisfied(valuation))
            .map(|t| t.to)
    }

    /// Check the structural contract the back end relies on.
    ///
    /// An empty automaton is valid. Otherwise exactly one state carries the
    /// initial id, at most one the accepting-well id, and every guard and
    /// destination stays within the automaton.
    pub fn validate(&self) -> Result<(), IrError> {
        let declared = self.propositions.mask();
        let mut names: HashMap<(i32, i32), StateId> = HashMap::new();

        for (sid, state) in self.states.iter().enumerate() {
            if let Some(&first) = names.get(&(state.id, state.final_marker)) {
                return Err(IrError::DuplicateStateName {
                    first,
                    second: sid,
                    id: state.id,
                    final_marker: state.final_marker,
                });
            }
            names.insert((state.id, state.final_marker), sid);

            for (tid, t) in state.transitions.iter().enumerate() {
                if t.to >= self.states.len() {
                    return Err(IrError::DanglingTransition {
                        state: sid,
                        transition: tid,
                        to: t.to,
                    });
                }
                let stray = t.guard.support() & !declared;
                if stray != 0 {
                    return Err(IrError::GuardOutOfRange {
                        state: sid,
                        transition: tid,
                        bit: stray.trailing_zeros(),
                        count: self.propositions.len(),
                    });
                }
            }
        }

        if self.states.is_empty() {
            return Ok(());
        }

        match self.states.iter().filter(|s| s.is_initial()).count() {
            0 => return Err(IrError::MissingInitialState),
            1 => {}
            n => return Err(IrError::MultipleInitialStates(n)),
        }

        let wells: Vec<StateId> = self
            .states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_accepting_well())
            .map(|(sid, _)| sid)
            .collect();
        if wells.len() > 1 {
            return Err(IrError::MultipleAcceptingWells(wells.len()));
        }
        if let Some(&well) = wells.first() {
            let transitions = &self.states[well].transitions;
            let absorbing = transitions.iter().all(|t| t.to == well);
            let total = transitions.iter().any(|t| t.guard.is_always());
            if !absorbing || !total {
                return Err(IrError::MalformedAcceptingWell(well));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Büchi Automaton:")?;
        writeln!(f, "  Propositions:")?;
        for (i, name) in self.propositions.iter() {
            writeln!(f, "    p{i}: {name}")?;
        }
        writeln!(f, "  Accept marker: {}", self.accept_marker)?;
        writeln!(f, "  States:")?;
        for (sid, state) in self.states.iter().enumerate() {
            let mut tags = Vec::new();
            if state.is_initial() {
                tags.push("initial");
            }
            if state.is_accepting_well() {
                tags.push("well");
            }
            if state.final_marker == self.accept_marker {
                tags.push("accepting");
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" ({})", tags.join(", "))
            };
            writeln!(
                f,
                "    S{sid}: id={} final={}{tags}",
                state.id, state.final_marker
            )?;
            for t in &state.transitions {
                writeln!(f, "      -> S{} when {}", t.to, t.guard)?;
            }
        }
        Ok(())
    }
}
