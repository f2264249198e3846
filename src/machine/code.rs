use crate::ast::Expression;

use super::{Addr, LocalEnv, Value};

/// The current instruction (spec.md §3 "Code").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// Evaluate an expression under a local env.
    Eval(Expression, LocalEnv),
    /// Enter the closure at `addr`.
    Enter(Addr),
    /// A primitive int has been produced, to be consumed by the top
    /// return-stack continuation.
    ReturnInt(i64),
    /// A data constructor has been produced.
    ReturnConstructor(String, Vec<Value>),
    /// Pre-startup sentinel.
    Uninitialized,
}

impl Default for Code {
    fn default() -> Self {
        Code::Uninitialized
    }
}
