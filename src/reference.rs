//! Colon-qualified field references embedded in transformation text.
//!
//! A reference is `table:field`, e.g. `orders:amount` or `A:A7`. Both parts are
//! identifiers; the field part may end in digits.

use indexmap::IndexSet;
use regex::Regex;
use std::sync::OnceLock;

use crate::model::Graph;

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*:[A-Za-z_][A-Za-z0-9_]*\b")
            .expect("reference pattern is valid")
    })
}

/// Distinct references in order of first appearance.
pub fn references(text: &str) -> IndexSet<&str> {
    reference_regex()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// Replace every reference that resolves to a field with `table name.field name`.
///
/// Tokens that do not name a field of `graph` are left as written.
pub fn substitute_names(graph: &Graph, text: &str) -> String {
    reference_regex()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let token = &caps[0];
            match graph.field(token) {
                Some(field) => match graph.table(&field.table_id) {
                    Some(table) => format!("{}.{}", table.name, field.name),
                    None => field.name.clone(),
                },
                None => token.to_string(),
            }
        })
        .into_owned()
}
