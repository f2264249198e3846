use super::LambdaForm;

/// `name = lambda-form`. A program is an ordered list of bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub lambda_form: LambdaForm,
}
