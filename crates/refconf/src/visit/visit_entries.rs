use super::Visit;
use crate::value::{Map, Value};

/// Recursively visit all entries of nested mappings
///
/// Entries are visited depth first in document order. Arrays and scalars are handed to the visitor but never
/// descended into.
pub trait VisitEntries {
    fn visit_entries(&self, visitor: &mut dyn Visit<Value>);
}

impl VisitEntries for Map {
    fn visit_entries(&self, visitor: &mut dyn Visit<Value>) {
        visit_map(self, "", visitor);
    }
}

fn visit_map(map: &Map, prefix: &str, visitor: &mut dyn Visit<Value>) {
    for (key, value) in map {
        visitor.visit(prefix, key, value);

        if let Value::Object(child) = value {
            let child_prefix = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            visit_map(child, &child_prefix, visitor);
        }
    }
}
