use crate::ast::LambdaForm;

use super::Value;

/// A lambda form together with a vector of values, one per free-variable
/// slot in the lambda, captured at allocation time (spec.md §3
/// "Closure"). A closure never holds references into the local
/// environment that created it — only values — which is what makes
/// `let` and update-in-place correct (spec.md §9 "Closures capture by
/// value").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    pub lambda_form: LambdaForm,
    pub free_values: Vec<Value>,
}

impl Closure {
    pub fn new(lambda_form: LambdaForm, free_values: Vec<Value>) -> Self {
        debug_assert_eq!(
            lambda_form.free_vars.len(),
            free_values.len(),
            "closure arity invariant violated: {} free-var identifiers, {} free values",
            lambda_form.free_vars.len(),
            free_values.len(),
        );
        Self {
            lambda_form,
            free_values,
        }
    }

    /// A closure whose free values are not yet known, used only while a
    /// binding's address is being reserved ahead of resolving its free
    /// variables (spec.md §9 "cyclic top-level references"). Never
    /// entered: callers always overwrite it via [`super::Heap::update`]
    /// before the machine runs.
    pub fn placeholder(lambda_form: LambdaForm) -> Self {
        let free_values = vec![Value::PrimInt(0); lambda_form.free_vars.len()];
        Self {
            lambda_form,
            free_values,
        }
    }

    pub fn is_updatable(&self) -> bool {
        self.lambda_form.is_updatable()
    }
}
