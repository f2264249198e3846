use stg_machine::compiler::compile;
use stg_machine::diagnostics::StgError;
use stg_machine::driver::run_to_final;
use stg_machine::parser::parse_program;

#[test]
fn applying_an_unbound_name_fails_with_env_lookup_failed() {
    let program = parse_program("define main = {} \\u {} -> bogus {}").unwrap();
    let state = compile(&program).unwrap();
    let err = run_to_final(state).unwrap_err();
    assert!(matches!(err, StgError::EnvLookupFailed { name } if name == "bogus"));
}
