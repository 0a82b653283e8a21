use std::collections::HashMap;

use ltlmon_ir::{Guard, PropositionTable, State};

use crate::CodegenError;

/// Turn an arbitrary proposition name into a C identifier fragment.
///
/// Characters outside `[A-Za-z0-9_]` become `_`; a leading digit gets a `_` prefix.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Whether `s` is already a valid C identifier.
pub fn is_c_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Sanitised identifier per proposition, in table order.
pub fn proposition_identifiers(props: &PropositionTable) -> Result<Vec<String>, CodegenError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut idents = Vec::with_capacity(props.len());
    for (_, name) in props.iter() {
        let ident = sanitize_identifier(name);
        if let Some(first) = seen.get(&ident) {
            return Err(CodegenError::IdentifierCollision {
                first: first.to_string(),
                second: name.to_string(),
                ident,
            });
        }
        seen.insert(ident.clone(), name);
        idents.push(ident);
    }
    Ok(idents)
}

/// Number fragment usable inside an identifier (`-3` becomes `n3`).
fn ident_number(n: i64) -> String {
    if n < 0 {
        format!("n{}", n.unsigned_abs())
    } else {
        n.to_string()
    }
}

/// Enumerator naming a state, derived from `(id + 1, final)`.
pub fn state_tag(prefix: &str, state: &State) -> String {
    format!(
        "{prefix}_state_{}_{}",
        ident_number(i64::from(state.id) + 1),
        ident_number(i64::from(state.final_marker))
    )
}

/// Render a guard as a conjunction of proposition variables, or `1`.
pub fn render_guard(guard: &Guard, atomics: &[String]) -> String {
    if guard.is_always() {
        return "1".to_string();
    }
    guard
        .literals()
        .map(|(prop, positive)| {
            if positive {
                atomics[prop].clone()
            } else {
                format!("!{}", atomics[prop])
            }
        })
        .collect::<Vec<_>>()
        .join(" && ")
}

/// C boolean literal.
pub fn c_bool(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// Make free text safe inside a `/* ... */` comment.
pub fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}
