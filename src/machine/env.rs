use std::collections::HashMap;

use crate::ast::Atom;
use crate::diagnostics::StgError;

use super::{Addr, Value};

/// Mapping from top-level variable name to its heap address. Populated
/// once during compilation; immutable thereafter (spec.md §4.1).
#[derive(Debug, Clone, Default)]
pub struct GlobalEnv {
    bindings: HashMap<String, Addr>,
}

impl GlobalEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, addr: Addr) {
        self.bindings.insert(name, addr);
    }

    pub fn get(&self, name: &str) -> Option<Addr> {
        self.bindings.get(name).copied()
    }
}

/// Mapping from variable name to value, constructed anew whenever a
/// closure is entered (spec.md §4.1 "LocalEnvironment"). Cheap,
/// clone-on-extend — a closure's captured free-value vector is the
/// thing that gets shared, never this map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalEnv {
    bindings: HashMap<String, Value>,
}

impl LocalEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            bindings: pairs.into_iter().collect(),
        }
    }

    /// Returns a clone of `self` with `name` bound to `value`, local
    /// bindings shadowing any existing binding of the same name.
    pub fn extended(&self, name: String, value: Value) -> Self {
        let mut bindings = self.bindings.clone();
        bindings.insert(name, value);
        Self { bindings }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).copied()
    }

    /// All bindings, in unspecified order. Used by trace formatting.
    pub fn iter(&self) -> impl Iterator<Item = (String, Value)> + '_ {
        self.bindings.iter().map(|(k, v)| (k.clone(), *v))
    }
}

/// Search `local` first, then `global` — local bindings shadow global
/// ones (spec.md §4.1 "lookupVariable").
pub fn lookup_variable(
    local: &LocalEnv,
    global: &GlobalEnv,
    name: &str,
) -> Result<Value, StgError> {
    if let Some(value) = local.get(name) {
        return Ok(value);
    }
    if let Some(addr) = global.get(name) {
        return Ok(Value::Addr(addr));
    }
    Err(StgError::EnvLookupFailed {
        name: name.to_owned(),
    })
}

/// Literal ints lift directly; variables go through [`lookup_variable`]
/// (spec.md §4.1 "lookupAtom").
pub fn lookup_atom(local: &LocalEnv, global: &GlobalEnv, atom: &Atom) -> Result<Value, StgError> {
    match atom {
        Atom::Literal { value, .. } => Ok(Value::PrimInt(*value)),
        Atom::Variable { name, .. } => lookup_variable(local, global, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_shadows_global() {
        let mut global = GlobalEnv::new();
        global.insert("x".into(), Addr(7));
        let local = LocalEnv::from_pairs([("x".to_owned(), Value::PrimInt(42))]);

        assert_eq!(
            lookup_variable(&local, &global, "x").unwrap(),
            Value::PrimInt(42)
        );
    }

    #[test]
    fn falls_back_to_global() {
        let mut global = GlobalEnv::new();
        global.insert("x".into(), Addr(7));
        let local = LocalEnv::new();

        assert_eq!(
            lookup_variable(&local, &global, "x").unwrap(),
            Value::Addr(Addr(7))
        );
    }

    #[test]
    fn unbound_variable_fails() {
        let global = GlobalEnv::new();
        let local = LocalEnv::new();

        assert!(matches!(
            lookup_variable(&local, &global, "bogus"),
            Err(StgError::EnvLookupFailed { name }) if name == "bogus"
        ));
    }
}
