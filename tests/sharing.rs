//! spec.md §8 "Sharing": a thunk used twice is forced once. Counts
//! `Eval(FnApplication(plus#, ..))` occurrences across the trace rather
//! than inspecting the heap directly, matching the scenario's own
//! stated test method.

use stg_machine::compiler::compile;
use stg_machine::driver::trace_run;
use stg_machine::machine::Code;
use stg_machine::parser::parse_program;

fn is_plus_intrinsic_eval(code: &Code) -> bool {
    matches!(
        code,
        Code::Eval(stg_machine::ast::Expression::FnApplication(app), _) if app.function == "plus#"
    )
}

#[test]
fn shared_thunk_is_evaluated_once() {
    let program = parse_program(
        "define main = {} \\u {} -> let x = {} \\u {} -> plus# {1, 2} \
         in case x {} of { a -> case x {} of { b -> plus# {a, b} } }",
    )
    .unwrap();
    let state = compile(&program).unwrap().with_tracing();

    let (states, error) = trace_run(state);
    assert!(error.is_none());

    let plus_evals = states
        .iter()
        .filter(|s| is_plus_intrinsic_eval(&s.code))
        .count();
    // One occurrence for `x`'s own `plus# {1, 2}`, one for the final
    // `plus# {a, b}` — never a second evaluation of `x`.
    assert_eq!(plus_evals, 2);

    assert_eq!(states.last().unwrap().code, Code::ReturnInt(6));
}
