//! Structural JSON dump of an automaton.
//!
//! Independent of the analysis: labels are arena indices and the document is a
//! direct rendering of states, guards and the proposition table.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ltlmon_ir::Automaton;

use crate::CodegenError;

/// Top-level JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonAutomaton {
    pub nb_state: usize,
    pub nb_sym: usize,
    pub symbols: Vec<String>,
    /// Label of the initial state; `null` when the automaton is empty.
    pub init_state: Option<usize>,
    pub states: Vec<JsonState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonState {
    pub label: usize,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub trans: Vec<JsonTransition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonTransition {
    pub dest: usize,
    /// Propositions the guard requires to hold.
    pub pos: Vec<String>,
    /// Propositions the guard requires to be false.
    pub neg: Vec<String>,
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

/// Build the document without serializing it.
pub fn build_json_document(automaton: &Automaton) -> JsonAutomaton {
    let props = &automaton.propositions;

    let states = automaton
        .states
        .iter()
        .enumerate()
        .map(|(label, state)| JsonState {
            label,
            is_final: automaton.is_accepting_witness(label),
            trans: state
                .transitions
                .iter()
                .map(|t| JsonTransition {
                    dest: t.to,
                    pos: owned(props.names_in(t.guard.pos)),
                    neg: owned(props.names_in(t.guard.neg)),
                })
                .collect(),
        })
        .collect();

    JsonAutomaton {
        nb_state: automaton.count_states(),
        nb_sym: props.len(),
        symbols: props.iter().map(|(_, name)| name.to_string()).collect(),
        init_state: automaton.initial_state(),
        states,
    }
}

/// Validate the automaton and pretty-print its JSON document.
///
/// `init_state` is an integer label except for an automaton with no states,
/// where it is `null`; consumers expecting a label must handle that case.
pub fn generate_json(automaton: &Automaton) -> Result<String, CodegenError> {
    automaton.validate()?;
    let document = build_json_document(automaton);
    let mut out = serde_json::to_string_pretty(&document)?;
    out.push('\n');
    debug!(
        "emitted JSON document: {} states, {} bytes",
        document.nb_state,
        out.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltlmon_ir::automaton::{ACCEPTING_WELL_ID, INITIAL_STATE_ID};
    use ltlmon_ir::{Guard, PropositionTable};

    #[test]
    fn test_two_state_document() {
        let mut ba = Automaton::new(PropositionTable::new(["p"]).unwrap(), 1);
        let s0 = ba.add_state(ACCEPTING_WELL_ID, 1);
        let s1 = ba.add_state(INITIAL_STATE_ID, 0);
        ba.add_transition(s0, Guard::always(), s0);
        ba.add_transition(s1, Guard::always().with_pos(0), s0);

        let json: serde_json::Value =
            serde_json::from_str(&generate_json(&ba).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "nb_state": 2,
                "nb_sym": 1,
                "symbols": ["p"],
                "init_state": 1,
                "states": [
                    {"label": 0, "final": true, "trans": [{"dest": 0, "pos": [], "neg": []}]},
                    {"label": 1, "final": false, "trans": [{"dest": 0, "pos": ["p"], "neg": []}]}
                ]
            })
        );
    }

    #[test]
    fn test_final_follows_accept_marker() {
        let mut ba = Automaton::new(PropositionTable::new(["a", "b", "c"]).unwrap(), 3);
        let init = ba.add_state(INITIAL_STATE_ID, 3);
        let other = ba.add_state(5, 1);
        ba.add_transition(init, Guard::always().with_neg(2).with_pos(0), other);
        ba.add_transition(other, Guard::always().with_neg(0).with_neg(1), init);

        let doc = build_json_document(&ba);
        assert!(doc.states[0].is_final);
        assert!(!doc.states[1].is_final);
        assert_eq!(doc.states[0].trans[0].pos, vec!["a"]);
        assert_eq!(doc.states[0].trans[0].neg, vec!["c"]);
        assert_eq!(doc.states[1].trans[0].neg, vec!["a", "b"]);
        assert!(doc.states[1].trans[0].pos.is_empty());
    }

    #[test]
    fn test_empty_automaton_has_null_init() {
        let ba = Automaton::new(PropositionTable::new(["p", "q"]).unwrap(), 1);
        let out = generate_json(&ba).unwrap();
        let doc: JsonAutomaton = serde_json::from_str(&out).unwrap();
        assert_eq!(doc.nb_state, 0);
        assert_eq!(doc.nb_sym, 2);
        assert_eq!(doc.init_state, None);
        assert!(doc.states.is_empty());
        assert!(out.contains("\"init_state\": null"));
    }

    #[test]
    fn test_invalid_automaton_is_rejected() {
        let mut ba = Automaton::new(PropositionTable::new(["p"]).unwrap(), 1);
        let init = ba.add_state(INITIAL_STATE_ID, 0);
        ba.add_transition(init, Guard::always(), 9);
        assert!(matches!(
            generate_json(&ba),
            Err(CodegenError::InvalidAutomaton(_))
        ));
    }
}
