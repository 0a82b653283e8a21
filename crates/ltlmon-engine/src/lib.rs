#![doc = include_str!("../README.md")]

//! Stutter-acceptance analysis for the ltlmon back end.
//!
//! [`analyze`] validates a frozen automaton, runs the stutter analyzer once
//! per valuation and builds the structural acceptance tables. The result is
//! read-only input for the emitters in `ltlmon-codegen`.

pub mod acceptance;
pub mod stutter;

use thiserror::Error;
use tracing::info;

use ltlmon_ir::{Automaton, IrError};

pub use acceptance::{surely_accept, surely_reject, AcceptanceTables, Verdict};
pub use stutter::{
    compute_stutter_table, compute_stutter_table_with, Mark, StutterAnalyzer, StutterTable,
};

/// Errors returned by the analysis entry points.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The automaton breaks the contract with the translation stage.
    #[error("invalid automaton: {0}")]
    InvalidAutomaton(#[from] IrError),
    /// `states * 2^propositions` exceeds `limit` cells or addressable memory.
    #[error(
        "stutter table for {states} states over {valuations} valuations exceeds {limit} cells"
    )]
    TableTooLarge {
        states: usize,
        valuations: u64,
        limit: usize,
    },
}

/// Resource limits for [`analyze_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Largest stutter table, in cells, the analysis will allocate.
    pub max_table_cells: usize,
}

impl AnalysisOptions {
    pub const DEFAULT_MAX_TABLE_CELLS: usize = 1 << 28;
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            max_table_cells: Self::DEFAULT_MAX_TABLE_CELLS,
        }
    }
}

/// Compute the stutter, surely-accept and surely-reject tables.
pub fn analyze(automaton: &Automaton) -> Result<AcceptanceTables, EngineError> {
    analyze_with(automaton, &AnalysisOptions::default())
}

/// [`analyze`] under explicit resource limits.
pub fn analyze_with(
    automaton: &Automaton,
    options: &AnalysisOptions,
) -> Result<AcceptanceTables, EngineError> {
    let stutter = compute_stutter_table_with(automaton, options)?;
    let tables = AcceptanceTables {
        surely_accept: surely_accept(automaton),
        surely_reject: surely_reject(automaton),
        stutter,
    };
    info!(
        "stutter analysis complete: {} states, {} valuations",
        tables.stutter.n_states(),
        tables.stutter.n_valuations()
    );
    Ok(tables)
}
