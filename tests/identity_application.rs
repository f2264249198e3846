use stg_machine::compiler::compile;
use stg_machine::driver::run_to_final;
use stg_machine::machine::Code;
use stg_machine::parser::parse_program;

#[test]
fn identity_applied_to_a_literal_returns_the_literal() {
    let program =
        parse_program("define main = {} \\u {} -> id {1}; define id = {} \\n {x} -> x {}")
            .unwrap();
    let state = compile(&program).unwrap();
    let final_state = run_to_final(state).unwrap();
    assert_eq!(final_state.code, Code::ReturnInt(1));
}
