#![doc = include_str!("../README.md")]

//! Emitters for analysed Büchi automata.
//!
//! Two back ends share one input: a C monitor for bounded model checkers and
//! a JSON document describing the automaton for external tooling.

pub mod common;
pub mod json_gen;
pub mod monitor_gen;

pub use json_gen::{build_json_document, generate_json, JsonAutomaton, JsonState, JsonTransition};
pub use monitor_gen::render_monitor;

use ltlmon_engine::{analyze, EngineError};
use ltlmon_ir::{Automaton, IrError};

/// Output artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodegenTarget {
    /// C monitor with assume/assert primitives.
    Monitor,
    /// Structured JSON description of the automaton.
    Json,
}

/// Verification tool whose intrinsics the monitor calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum MonitorDialect {
    #[default]
    Esbmc,
    Cbmc,
}

impl MonitorDialect {
    /// Trace-pruning primitive.
    pub fn assume_fn(self) -> &'static str {
        match self {
            MonitorDialect::Esbmc => "__ESBMC_assume",
            MonitorDialect::Cbmc => "__CPROVER_assume",
        }
    }

    /// Fatal-verdict primitive, called with a condition and a label.
    pub fn assert_fn(self) -> &'static str {
        match self {
            MonitorDialect::Esbmc => "__ESBMC_assert",
            MonitorDialect::Cbmc => "__CPROVER_assert",
        }
    }

    /// Nondeterministic integer source. Both tools recognise `nondet_` prefixed
    /// undefined functions.
    pub fn nondet_fn(self) -> &'static str {
        "nondet_uint"
    }
}

/// Monitor emission settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorOptions {
    pub dialect: MonitorDialect,
    /// Prefix for every emitted C identifier. Must itself be an identifier.
    pub prefix: String,
    /// Text placed in a leading `/* ... */` comment, usually the formula.
    pub header: Option<String>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions {
            dialect: MonitorDialect::default(),
            prefix: "_ltl2ba".to_string(),
            header: None,
        }
    }
}

/// Errors returned by the emitters.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error(transparent)]
    Analysis(#[from] EngineError),
    #[error(transparent)]
    InvalidAutomaton(#[from] IrError),
    /// Two proposition names sanitise to the same C identifier.
    #[error("propositions '{first}' and '{second}' both map to identifier '{ident}'")]
    IdentifierCollision {
        first: String,
        second: String,
        ident: String,
    },
    #[error("identifier prefix '{0}' is not a C identifier")]
    InvalidPrefix(String),
    /// Tables were computed for a different automaton.
    #[error("acceptance tables do not match an automaton with {states} states and {valuations} valuations")]
    TableMismatch { states: usize, valuations: u64 },
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run the analysis and render a monitor.
pub fn generate_monitor(
    automaton: &Automaton,
    options: &MonitorOptions,
) -> Result<String, CodegenError> {
    let tables = analyze(automaton)?;
    render_monitor(automaton, &tables, options)
}

/// Generate the selected artifact. `options` only affects the monitor.
pub fn generate(
    automaton: &Automaton,
    target: CodegenTarget,
    options: &MonitorOptions,
) -> Result<String, CodegenError> {
    match target {
        CodegenTarget::Monitor => generate_monitor(automaton, options),
        CodegenTarget::Json => generate_json(automaton),
    }
}
