use stg_machine::compiler::compile;
use stg_machine::driver::run_to_final;
use stg_machine::machine::Code;
use stg_machine::parser::parse_program;

#[test]
fn plus_intrinsic_adds_two_literals() {
    let program = parse_program("define main = {} \\u {} -> plus# {2, 3}").unwrap();
    let state = compile(&program).unwrap();
    let final_state = run_to_final(state).unwrap();
    assert_eq!(final_state.code, Code::ReturnInt(5));
}
