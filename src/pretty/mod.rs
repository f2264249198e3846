//! Pretty-printing of machine states for trace output (spec.md §6
//! "Outputs/Trace"): one block per step, each with `Steps`, `Code`,
//! `Args`, `Return`, `Update`, `Heap`, `Env` sections.

use std::fmt::Write as _;

use crate::ast::Expression;
use crate::machine::{Closure, Code, LocalEnv, MachineState, Value};

/// Renders the full trace produced by [`crate::driver::trace_run`], one
/// block per state, in step order.
pub fn format_trace(states: &[MachineState]) -> String {
    let mut out = String::new();
    for (i, state) in states.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        format_state(&mut out, i, state);
    }
    out
}

/// Renders a single block for `state`, numbered `step`.
pub fn format_state(out: &mut String, step: usize, state: &MachineState) {
    let _ = writeln!(out, "Steps: {step}");
    let _ = writeln!(out, "Code: {}", format_code(&state.code));
    let _ = writeln!(out, "Args: {}", format_values(state.arg_stack.as_slice()));
    let _ = writeln!(
        out,
        "Return: {} continuation(s)",
        state.return_stack.len()
    );
    let _ = writeln!(out, "Update: {} frame(s)", state.update_stack.len());
    let _ = writeln!(out, "Heap: {} closure(s)", state.heap.len());
    let env = match &state.code {
        Code::Eval(_, local) => format_local_env(local),
        _ => "-".to_owned(),
    };
    let _ = writeln!(out, "Env: {env}");
}

fn format_code(code: &Code) -> String {
    match code {
        Code::Eval(expr, _) => format!("Eval({})", format_expression(expr)),
        Code::Enter(addr) => format!("Enter({addr})"),
        Code::ReturnInt(n) => format!("ReturnInt({n})"),
        Code::ReturnConstructor(con, values) => {
            format!("ReturnConstructor({con}, {})", format_values(values))
        }
        Code::Uninitialized => "Uninitialized".to_owned(),
    }
}

fn format_values(values: &[Value]) -> String {
    let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

fn format_local_env(local: &LocalEnv) -> String {
    let mut bindings: Vec<(String, Value)> = local.iter().collect();
    bindings.sort_by(|a, b| a.0.cmp(&b.0));
    let rendered: Vec<String> = bindings
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect();
    format!("{{{}}}", rendered.join(", "))
}

/// A shallow one-line rendering of an expression — used in traces, not
/// meant to round-trip through the parser.
fn format_expression(expr: &Expression) -> String {
    match expr {
        Expression::FnApplication(app) => {
            format!("{} {{{}}}", app.function, format_atom_names(&app.args))
        }
        Expression::Let(let_expr) => {
            let keyword = match let_expr.kind {
                crate::ast::LetKind::Let => "let",
                crate::ast::LetKind::LetRec => "letrec",
            };
            format!("{keyword} ... in {}", format_expression(&let_expr.body))
        }
        Expression::Case(case_expr) => {
            format!(
                "case {} of {{ {} alt(s) }}",
                format_expression(&case_expr.scrutinee),
                case_expr.alternatives.len()
            )
        }
        Expression::Constructor(ctor) => {
            format!("{} {{{}}}", ctor.name, format_atom_names(&ctor.atoms))
        }
        Expression::Int { value, .. } => value.to_string(),
        Expression::Binop(binop) => format!("{:?}", binop.op),
    }
}

fn format_atom_names(atoms: &[crate::ast::Atom]) -> String {
    atoms
        .iter()
        .map(|atom| match atom {
            crate::ast::Atom::Literal { value, .. } => value.to_string(),
            crate::ast::Atom::Variable { name, .. } => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per heap closure, in address order — used by callers that
/// want the `Heap` section expanded rather than just a count.
pub fn format_heap(state: &MachineState) -> String {
    let mut out = String::new();
    for i in 0..state.heap.len() {
        let addr = crate::machine::Addr(i);
        if let Ok(closure) = state.heap.lookup(addr) {
            let _ = writeln!(out, "{addr}: {}", format_closure(closure));
        }
    }
    out
}

fn format_closure(closure: &Closure) -> String {
    let marker = if closure.is_updatable() { "\\u" } else { "\\n" };
    format!(
        "{{{}}} {marker} {{{}}} -> {}",
        closure.lambda_form.free_vars.join(", "),
        closure.lambda_form.bound_vars.join(", "),
        format_expression(&closure.lambda_form.body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::parser::parse_program;

    #[test]
    fn formats_a_halted_state() {
        let program = parse_program("define main = {} \\u {} -> plus# {2, 3}").unwrap();
        let mut state = compile(&program).unwrap();
        while crate::evaluator::step(&mut state).unwrap() == crate::evaluator::StepOutcome::Stepped
        {
        }
        let mut out = String::new();
        format_state(&mut out, 0, &state);
        assert!(out.contains("Code: ReturnInt(5)"));
        assert!(out.contains("Heap:"));
    }

    #[test]
    fn formats_a_trace() {
        let program = parse_program("define main = {} \\u {} -> plus# {2, 3}").unwrap();
        let state = compile(&program).unwrap().with_tracing();
        let (states, error) = crate::driver::trace_run(state);
        assert!(error.is_none());
        let rendered = format_trace(&states);
        assert!(rendered.contains("Steps: 0"));
        assert!(rendered.matches("Steps:").count() == states.len());
    }
}
