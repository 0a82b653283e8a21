//! Stutter-acceptance analysis.
//!
//! For a fixed valuation `v`, a state is stutter-accepting when repeating `v`
//! forever from it must follow a path into a cycle containing an accepting
//! witness (`final == accept_marker` or the accepting well). The graph is
//! pruned to the transitions enabled by `v` before it is explored.
//!
//! Each pass is a depth-first search with an explicit frame stack. The first
//! accepting witness found settles every state still being explored as
//! accepting: each of them reaches the state that found the witness. A state
//! that exhausts its transitions is only settled as rejecting once its
//! strongly connected component is closed; until then a later edge into the
//! component may still expose an accepting cycle through it.

use tracing::{debug, warn};

use ltlmon_ir::{Automaton, StateId, Valuation};

use crate::{AnalysisOptions, EngineError};

/// Stutter tables larger than this are reported, since they are emitted verbatim.
const LARGE_TABLE_CELLS: usize = 1 << 20;

/// Per-pass exploration mark of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Unvisited,
    /// Entered in this pass, verdict not settled yet.
    OnStack,
    Rejecting,
    Accepting,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    state: StateId,
    next_transition: usize,
    lowlink: usize,
}

/// Reusable analyzer over one automaton. Marks live here, not on the states.
#[derive(Debug)]
pub struct StutterAnalyzer<'a> {
    automaton: &'a Automaton,
    marks: Vec<Mark>,
    discovery: Vec<usize>,
    stack_pos: Vec<usize>,
    /// Unsettled states in discovery order, with the number of accepting
    /// witnesses at or below each entry.
    stack: Vec<(StateId, usize)>,
    frames: Vec<Frame>,
    next_discovery: usize,
}

impl<'a> StutterAnalyzer<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        let n = automaton.count_states();
        Self {
            automaton,
            marks: vec![Mark::Unvisited; n],
            discovery: vec![0; n],
            stack_pos: vec![0; n],
            stack: Vec::with_capacity(n),
            frames: Vec::with_capacity(n),
            next_discovery: 0,
        }
    }

    /// Run one full pass for `valuation` and return the settled marks.
    ///
    /// Every mark is `Accepting` or `Rejecting` on return.
    pub fn run_pass(&mut self, valuation: Valuation) -> &[Mark] {
        self.marks.fill(Mark::Unvisited);
        self.stack.clear();
        self.frames.clear();
        self.next_discovery = 0;

        for root in 0..self.marks.len() {
            if self.marks[root] == Mark::Unvisited {
                self.explore(root, valuation);
            }
        }
        debug_assert!(self
            .marks
            .iter()
            .all(|m| matches!(m, Mark::Accepting | Mark::Rejecting)));
        &self.marks
    }

    fn explore(&mut self, root: StateId, valuation: Valuation) {
        let automaton = self.automaton;
        self.enter(root);

        while let Some(frame) = self.frames.last_mut() {
            let Some(t) = automaton.states[frame.state]
                .transitions
                .get(frame.next_transition)
            else {
                self.leave();
                continue;
            };
            frame.next_transition += 1;
            if !t.is_satisfied(valuation) {
                continue;
            }

            match self.marks[t.to] {
                Mark::Unvisited => self.enter(t.to),
                Mark::OnStack => {
                    // Cycle through the stack segment from `t.to` to the top.
                    let reach = self.discovery[t.to];
                    if let Some(frame) = self.frames.last_mut() {
                        frame.lowlink = frame.lowlink.min(reach);
                    }
                    if self.segment_has_witness(self.stack_pos[t.to]) {
                        self.accept_unsettled();
                    }
                }
                Mark::Accepting => self.accept_unsettled(),
                Mark::Rejecting => {}
            }
        }
    }

    fn enter(&mut self, state: StateId) {
        let order = self.next_discovery;
        self.next_discovery += 1;
        self.marks[state] = Mark::OnStack;
        self.discovery[state] = order;
        self.stack_pos[state] = self.stack.len();

        let below = self.stack.last().map_or(0, |&(_, w)| w);
        let witness = usize::from(self.automaton.is_accepting_witness(state));
        self.stack.push((state, below + witness));
        self.frames.push(Frame {
            state,
            next_transition: 0,
            lowlink: order,
        });
    }

    /// All transitions of the top frame are exhausted without a witness.
    fn leave(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if frame.lowlink == self.discovery[frame.state] {
            while let Some((top, _)) = self.stack.pop() {
                self.marks[top] = Mark::Rejecting;
                if top == frame.state {
                    break;
                }
            }
        }
        if let Some(parent) = self.frames.last_mut() {
            parent.lowlink = parent.lowlink.min(frame.lowlink);
        }
    }

    fn segment_has_witness(&self, from: usize) -> bool {
        let below = if from == 0 { 0 } else { self.stack[from - 1].1 };
        self.stack.last().map_or(0, |&(_, w)| w) > below
    }

    /// Every unsettled state reaches the one that just found a witness.
    fn accept_unsettled(&mut self) {
        for (state, _) in self.stack.drain(..) {
            self.marks[state] = Mark::Accepting;
        }
        self.frames.clear();
    }
}

/// `stutter[valuation][state]`, stored valuation-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StutterTable {
    n_states: usize,
    n_valuations: usize,
    cells: Vec<bool>,
}

impl StutterTable {
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_valuations(&self) -> usize {
        self.n_valuations
    }

    pub fn get(&self, valuation: Valuation, state: StateId) -> bool {
        self.row(valuation)[state]
    }

    pub fn row(&self, valuation: Valuation) -> &[bool] {
        let start = valuation as usize * self.n_states;
        &self.cells[start..start + self.n_states]
    }

    /// Rows in valuation order. Yields nothing for an automaton without states.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.n_states.max(1))
    }

    /// Flat valuation-major cells, the layout of the emitted monitor table.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }
}

/// Run the analyzer once per valuation of the automaton's propositions.
pub fn compute_stutter_table(automaton: &Automaton) -> Result<StutterTable, EngineError> {
    compute_stutter_table_with(automaton, &AnalysisOptions::default())
}

/// [`compute_stutter_table`] refusing tables above `options.max_table_cells`.
pub fn compute_stutter_table_with(
    automaton: &Automaton,
    options: &AnalysisOptions,
) -> Result<StutterTable, EngineError> {
    automaton.validate()?;

    let n_states = automaton.count_states();
    let count = automaton.propositions.valuation_count();
    let limit = options.max_table_cells;
    let too_large = || EngineError::TableTooLarge {
        states: n_states,
        valuations: count,
        limit,
    };
    let n_valuations = usize::try_from(count).map_err(|_| too_large())?;
    let n_cells = n_states
        .checked_mul(n_valuations)
        .filter(|cells| *cells <= limit)
        .ok_or_else(too_large)?;
    if n_cells > LARGE_TABLE_CELLS {
        warn!(
            "stutter table has {n_cells} cells ({n_states} states x {n_valuations} valuations)"
        );
    }

    let mut cells = Vec::with_capacity(n_cells);
    if n_states > 0 {
        let mut analyzer = StutterAnalyzer::new(automaton);
        for valuation in automaton.propositions.valuations() {
            let marks = analyzer.run_pass(valuation);
            let before = cells.len();
            cells.extend(marks.iter().map(|m| *m == Mark::Accepting));
            let accepting = cells[before..].iter().filter(|c| **c).count();
            debug!(valuation, accepting, "stutter pass complete");
        }
    }

    Ok(StutterTable {
        n_states,
        n_valuations,
        cells,
    })
}
