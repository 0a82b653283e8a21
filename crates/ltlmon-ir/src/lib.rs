#![doc = include_str!("../README.md")]

//! Automaton graph representation for the ltlmon back end.
//!
//! This crate defines the Büchi automaton produced by the translation stage,
//! the atomic-proposition table, guard bitmasks, and the valuation encoder
//! used by the stutter analysis and the emitters.

pub mod automaton;
pub mod errors;
pub mod propositions;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod valuation;

pub use automaton::{Automaton, State, StateId, Transition};
pub use errors::IrError;
pub use propositions::{PropositionId, PropositionTable};
pub use valuation::{Guard, Valuation, MAX_PROPOSITIONS};
