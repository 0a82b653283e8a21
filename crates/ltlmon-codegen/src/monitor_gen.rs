//! C monitor emitter.
//!
//! The monitor encodes every admissible run of the automaton for a bounded
//! model checker: `<prefix>_transition()` takes one nondeterministically
//! chosen transition per call, and `<prefix>_result()` turns the current state
//! and proposition values into a sure-reject / sure-accept / stutter verdict.

use std::fmt::Write;

use tracing::debug;

use ltlmon_engine::AcceptanceTables;
use ltlmon_ir::Automaton;

use crate::common::*;
use crate::{CodegenError, MonitorDialect, MonitorOptions};

/// Everything the writers need, resolved once.
struct MonitorContext<'a> {
    automaton: &'a Automaton,
    prefix: &'a str,
    dialect: MonitorDialect,
    atomics: Vec<String>,
    tags: Vec<String>,
}

impl MonitorContext<'_> {
    fn assume(&self) -> &'static str {
        self.dialect.assume_fn()
    }

    fn assert(&self) -> &'static str {
        self.dialect.assert_fn()
    }

    fn state_var(&self) -> String {
        format!("{}_state_var", self.prefix)
    }
}

/// Render a monitor from pre-computed tables.
pub fn render_monitor(
    automaton: &Automaton,
    tables: &AcceptanceTables,
    options: &MonitorOptions,
) -> Result<String, CodegenError> {
    if !is_c_identifier(&options.prefix) {
        return Err(CodegenError::InvalidPrefix(options.prefix.clone()));
    }
    automaton.validate()?;
    let n_states = automaton.count_states();
    let n_valuations = automaton.propositions.valuation_count();
    if tables.surely_accept.len() != n_states
        || tables.surely_reject.len() != n_states
        || tables.stutter.n_states() != n_states
        || tables.stutter.n_valuations() as u64 != n_valuations
    {
        return Err(CodegenError::TableMismatch {
            states: n_states,
            valuations: n_valuations,
        });
    }

    let ctx = MonitorContext {
        automaton,
        prefix: &options.prefix,
        dialect: options.dialect,
        atomics: proposition_identifiers(&automaton.propositions)?
            .iter()
            .map(|ident| format!("{}_atomic_{ident}", options.prefix))
            .collect(),
        tags: automaton
            .states
            .iter()
            .map(|s| state_tag(&options.prefix, s))
            .collect(),
    };

    let mut out = String::new();
    write_header(&mut out, options.header.as_deref());
    write_atomics(&mut out, &ctx);

    if automaton.is_empty() {
        write_blocked_transition(&mut out, &ctx);
    } else {
        write_states(&mut out, &ctx)?;
        write_transition_function(&mut out, &ctx);
        write_surely_tables(&mut out, &ctx, tables);
        write_stutter_table(&mut out, &ctx, tables);
        write_sym_to_id(&mut out, &ctx);
        write_result_function(&mut out, &ctx);
    }

    debug!(
        "emitted {:?} monitor: {} states, {} bytes",
        options.dialect,
        n_states,
        out.len()
    );
    Ok(out)
}

fn write_header(out: &mut String, header: Option<&str>) {
    if let Some(text) = header {
        writeln!(out, "/* {} */", comment_safe(text)).unwrap();
        writeln!(out).unwrap();
    }
}

fn write_atomics(out: &mut String, ctx: &MonitorContext<'_>) {
    for atomic in &ctx.atomics {
        writeln!(out, "_Bool {atomic} = 0;").unwrap();
    }
    writeln!(out).unwrap();
}

fn write_blocked_transition(out: &mut String, ctx: &MonitorContext<'_>) {
    writeln!(out, "void\n{}_transition() {{", ctx.prefix).unwrap();
    writeln!(out, "\t{}(0);", ctx.assume()).unwrap();
    writeln!(out, "}}").unwrap();
}

fn write_states(out: &mut String, ctx: &MonitorContext<'_>) -> Result<(), CodegenError> {
    writeln!(out, "typedef enum {{").unwrap();
    for tag in &ctx.tags {
        writeln!(out, "\t{tag},").unwrap();
    }
    writeln!(out, "}} {}_state;", ctx.prefix).unwrap();
    writeln!(out).unwrap();

    let init = ctx
        .automaton
        .initial_state()
        .ok_or(ltlmon_ir::IrError::MissingInitialState)?;
    writeln!(
        out,
        "{}_state {} = {};",
        ctx.prefix,
        ctx.state_var(),
        ctx.tags[init]
    )
    .unwrap();
    writeln!(out).unwrap();
    Ok(())
}

fn write_transition_function(out: &mut String, ctx: &MonitorContext<'_>) {
    let state_var = ctx.state_var();
    writeln!(out, "unsigned int {}(void);", ctx.dialect.nondet_fn()).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "void\n{}_transition() {{", ctx.prefix).unwrap();
    writeln!(out, "\tunsigned int choice = {}();", ctx.dialect.nondet_fn()).unwrap();
    writeln!(out, "\tswitch ({state_var}) {{").unwrap();

    for (sid, state) in ctx.automaton.states.iter().enumerate() {
        writeln!(out, "\tcase {}:", ctx.tags[sid]).unwrap();

        // Reaching the accepting well is a definite verdict.
        if state.is_accepting_well() {
            writeln!(out, "\t\t{}(0, \"Error sure\");", ctx.assert()).unwrap();
            writeln!(out, "\t\tbreak;").unwrap();
            continue;
        }

        if state.transitions.is_empty() {
            writeln!(out, "\t\t{}(0);", ctx.assume()).unwrap();
            writeln!(out, "\t\tbreak;").unwrap();
            continue;
        }

        write!(out, "\t\t").unwrap();
        for (index, t) in state.transitions.iter().enumerate() {
            if index > 0 {
                write!(out, " else ").unwrap();
            }
            writeln!(out, "if (choice == {index}) {{").unwrap();
            writeln!(
                out,
                "\t\t\t{}({});",
                ctx.assume(),
                render_guard(&t.guard, &ctx.atomics)
            )
            .unwrap();
            writeln!(out, "\t\t\t{state_var} = {};", ctx.tags[t.to]).unwrap();
            write!(out, "\t\t}}").unwrap();
        }
        // Choices past the last transition are pruned.
        writeln!(out, " else {{").unwrap();
        writeln!(out, "\t\t\t{}(0);", ctx.assume()).unwrap();
        writeln!(out, "\t\t}}").unwrap();
        writeln!(out, "\t\tbreak;").unwrap();
    }

    writeln!(out, "\t}}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();
}

fn write_bool_array(out: &mut String, name: &str, values: &[bool]) {
    let body = values
        .iter()
        .map(|v| c_bool(*v))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "_Bool {name}[{}] = {{{body}}};", values.len()).unwrap();
}

fn write_surely_tables(out: &mut String, ctx: &MonitorContext<'_>, tables: &AcceptanceTables) {
    write_bool_array(
        out,
        &format!("{}_surely_accept", ctx.prefix),
        &tables.surely_accept,
    );
    write_bool_array(
        out,
        &format!("{}_surely_reject", ctx.prefix),
        &tables.surely_reject,
    );
    writeln!(out).unwrap();
}

fn write_stutter_table(out: &mut String, ctx: &MonitorContext<'_>, tables: &AcceptanceTables) {
    writeln!(
        out,
        "_Bool {}_stutter_accept[{}] = {{",
        ctx.prefix,
        tables.stutter.cells().len()
    )
    .unwrap();
    for row in tables.stutter.rows() {
        write!(out, "\t").unwrap();
        for cell in row {
            write!(out, "{},", c_bool(*cell)).unwrap();
        }
        writeln!(out).unwrap();
    }
    writeln!(out, "}};").unwrap();
    writeln!(out).unwrap();
}

fn write_sym_to_id(out: &mut String, ctx: &MonitorContext<'_>) {
    writeln!(out, "unsigned int\n{}_sym_to_id() {{", ctx.prefix).unwrap();
    writeln!(out, "\tunsigned int id = 0;").unwrap();
    writeln!(out).unwrap();
    for (bit, atomic) in ctx.atomics.iter().enumerate() {
        writeln!(out, "\tid |= ((unsigned int) {atomic} << {bit});").unwrap();
    }
    writeln!(out, "\treturn id;").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();
}

fn write_result_function(out: &mut String, ctx: &MonitorContext<'_>) {
    let p = ctx.prefix;
    let state_var = ctx.state_var();
    let n_states = ctx.automaton.count_states();

    writeln!(out, "void\n{p}_result() {{").unwrap();
    writeln!(
        out,
        "\t_Bool reject_sure = {p}_surely_reject[{state_var}];"
    )
    .unwrap();
    writeln!(out, "\t{}(!reject_sure);", ctx.assume()).unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "\t_Bool accept_sure = {p}_surely_accept[{state_var}];"
    )
    .unwrap();
    writeln!(out, "\t{}(!accept_sure, \"ERROR SURE\");", ctx.assert()).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "\tunsigned int id = {p}_sym_to_id();").unwrap();
    writeln!(
        out,
        "\t_Bool accept_stutter = {p}_stutter_accept[id * {n_states} + {state_var}];"
    )
    .unwrap();
    writeln!(out, "\t{}(!accept_stutter, \"ERROR MAYBE\");", ctx.assert()).unwrap();
    writeln!(out, "\t{}(accept_stutter, \"VALID MAYBE\");", ctx.assert()).unwrap();
    writeln!(out, "}}").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltlmon_engine::analyze;
    use ltlmon_ir::automaton::{ACCEPTING_WELL_ID, INITIAL_STATE_ID};
    use ltlmon_ir::{Guard, PropositionTable};

    fn well_behind_p() -> Automaton {
        let mut ba = Automaton::new(PropositionTable::new(["p"]).unwrap(), 1);
        let s0 = ba.add_state(ACCEPTING_WELL_ID, 1);
        let s1 = ba.add_state(INITIAL_STATE_ID, 0);
        ba.add_transition(s0, Guard::always(), s0);
        ba.add_transition(s1, Guard::always().with_pos(0), s0);
        ba
    }

    fn render(ba: &Automaton, options: &MonitorOptions) -> String {
        let tables = analyze(ba).unwrap();
        render_monitor(ba, &tables, options).unwrap()
    }

    #[test]
    fn test_full_monitor_layout() {
        let code = render(&well_behind_p(), &MonitorOptions::default());
        let expected = "\
_Bool _ltl2ba_atomic_p = 0;

typedef enum {
\t_ltl2ba_state_1_1,
\t_ltl2ba_state_0_0,
} _ltl2ba_state;

_ltl2ba_state _ltl2ba_state_var = _ltl2ba_state_0_0;

unsigned int nondet_uint(void);

void
_ltl2ba_transition() {
\tunsigned int choice = nondet_uint();
\tswitch (_ltl2ba_state_var) {
\tcase _ltl2ba_state_1_1:
\t\t__ESBMC_assert(0, \"Error sure\");
\t\tbreak;
\tcase _ltl2ba_state_0_0:
\t\tif (choice == 0) {
\t\t\t__ESBMC_assume(_ltl2ba_atomic_p);
\t\t\t_ltl2ba_state_var = _ltl2ba_state_1_1;
\t\t} else {
\t\t\t__ESBMC_assume(0);
\t\t}
\t\tbreak;
\t}
}

_Bool _ltl2ba_surely_accept[2] = {1, 0};
_Bool _ltl2ba_surely_reject[2] = {0, 0};

_Bool _ltl2ba_stutter_accept[4] = {
\t1,0,
\t1,1,
};

unsigned int
_ltl2ba_sym_to_id() {
\tunsigned int id = 0;

\tid |= ((unsigned int) _ltl2ba_atomic_p << 0);
\treturn id;
}

void
_ltl2ba_result() {
\t_Bool reject_sure = _ltl2ba_surely_reject[_ltl2ba_state_var];
\t__ESBMC_assume(!reject_sure);

\t_Bool accept_sure = _ltl2ba_surely_accept[_ltl2ba_state_var];
\t__ESBMC_assert(!accept_sure, \"ERROR SURE\");

\tunsigned int id = _ltl2ba_sym_to_id();
\t_Bool accept_stutter = _ltl2ba_stutter_accept[id * 2 + _ltl2ba_state_var];
\t__ESBMC_assert(!accept_stutter, \"ERROR MAYBE\");
\t__ESBMC_assert(accept_stutter, \"VALID MAYBE\");
}
";
        assert_eq!(code, expected);
    }

    #[test]
    fn test_cbmc_dialect_and_prefix() {
        let options = MonitorOptions {
            dialect: MonitorDialect::Cbmc,
            prefix: "_mon".into(),
            header: Some("F p".into()),
        };
        let code = render(&well_behind_p(), &options);
        assert!(code.starts_with("/* F p */\n\n"));
        assert!(code.contains("__CPROVER_assume(_mon_atomic_p);"));
        assert!(code.contains("__CPROVER_assert(0, \"Error sure\");"));
        assert!(code.contains("_mon_state _mon_state_var = _mon_state_0_0;"));
        assert!(!code.contains("ESBMC"));
        assert!(!code.contains("_ltl2ba"));
    }

    #[test]
    fn test_dead_end_state_is_pruned() {
        let mut ba = Automaton::new(PropositionTable::new(["p", "q"]).unwrap(), 1);
        let init = ba.add_state(INITIAL_STATE_ID, 0);
        let dead = ba.add_state(4, 0);
        ba.add_transition(init, Guard::always().with_pos(0).with_neg(1), dead);
        ba.add_transition(init, Guard::always(), init);

        let code = render(&ba, &MonitorOptions::default());
        assert!(code.contains(
            "\tcase _ltl2ba_state_5_0:\n\t\t__ESBMC_assume(0);\n\t\tbreak;\n"
        ));
        assert!(code.contains("__ESBMC_assume(_ltl2ba_atomic_p && !_ltl2ba_atomic_q);"));
        assert!(code.contains("} else if (choice == 1) {\n\t\t\t__ESBMC_assume(1);"));
        assert!(code.contains("_Bool _ltl2ba_stutter_accept[8] = {"));
        assert!(code.contains("id * 2 + _ltl2ba_state_var"));
    }

    #[test]
    fn test_empty_automaton_blocks() {
        let ba = Automaton::new(PropositionTable::new(["p"]).unwrap(), 1);
        let code = render(&ba, &MonitorOptions::default());
        assert_eq!(
            code,
            "_Bool _ltl2ba_atomic_p = 0;\n\nvoid\n_ltl2ba_transition() {\n\t__ESBMC_assume(0);\n}\n"
        );
    }

    #[test]
    fn test_header_cannot_close_comment() {
        let options = MonitorOptions {
            header: Some("a */ b".into()),
            ..MonitorOptions::default()
        };
        let code = render(&well_behind_p(), &options);
        assert!(code.starts_with("/* a * / b */"));
    }

    #[test]
    fn test_invalid_prefix() {
        let options = MonitorOptions {
            prefix: "1bad".into(),
            ..MonitorOptions::default()
        };
        let ba = well_behind_p();
        let tables = analyze(&ba).unwrap();
        assert!(matches!(
            render_monitor(&ba, &tables, &options),
            Err(CodegenError::InvalidPrefix(p)) if p == "1bad"
        ));
    }

    #[test]
    fn test_tables_from_other_automaton_are_rejected() {
        let ba = well_behind_p();
        let empty = Automaton::new(PropositionTable::new(["p"]).unwrap(), 1);
        let tables = analyze(&empty).unwrap();
        assert!(matches!(
            render_monitor(&ba, &tables, &MonitorOptions::default()),
            Err(CodegenError::TableMismatch {
                states: 2,
                valuations: 2
            })
        ));
    }
}
