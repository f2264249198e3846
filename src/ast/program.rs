use super::Binding;

/// An ordered list of top-level bindings (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub bindings: Vec<Binding>,
}
