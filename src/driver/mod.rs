//! Drives the evaluator's `step` function to completion (spec.md §4.4).

use log::{debug, trace};

use crate::diagnostics::StgError;
use crate::evaluator::{step, StepOutcome};
use crate::machine::MachineState;

/// Advances `state` by exactly one step, logging the transition when
/// `state` was built with [`MachineState::with_tracing`].
pub fn drive_step(state: &mut MachineState) -> Result<StepOutcome, StgError> {
    let before = format!("{:?}", state.code);
    let outcome = step(state)?;
    trace!("{before} -> {:?} ({outcome:?})", state.code);
    state.record(format!("{before} -> {:?}", state.code));
    Ok(outcome)
}

/// Runs `state` to completion, collecting every intermediate state along
/// the way (spec.md §4.4 `trace`). Stops at the first error, which is
/// returned alongside whatever states were collected up to that point.
pub fn trace_run(mut state: MachineState) -> (Vec<MachineState>, Option<StgError>) {
    let mut states = vec![state.clone()];
    loop {
        match drive_step(&mut state) {
            Ok(StepOutcome::Stepped) => states.push(state.clone()),
            Ok(StepOutcome::Halted) => {
                states.push(state.clone());
                return (states, None);
            }
            Err(err) => return (states, Some(err)),
        }
    }
}

/// Runs `state` to completion without retaining intermediate states
/// (spec.md §4.4 `runToFinal`).
pub fn run_to_final(mut state: MachineState) -> Result<MachineState, StgError> {
    debug!("starting run");
    loop {
        match drive_step(&mut state)? {
            StepOutcome::Stepped => {}
            StepOutcome::Halted => {
                debug!("halted: {:?}", state.code);
                return Ok(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::machine::Code;
    use crate::parser::parse_program;

    #[test]
    fn run_to_final_halts_on_simple_program() {
        let program = parse_program("define main = {} \\u {} -> plus# {2, 3}").unwrap();
        let state = compile(&program).unwrap();
        let final_state = run_to_final(state).unwrap();
        assert_eq!(final_state.code, Code::ReturnInt(5));
    }

    #[test]
    fn trace_run_records_every_intermediate_state() {
        let program = parse_program("define main = {} \\u {} -> plus# {2, 3}").unwrap();
        let state = compile(&program).unwrap().with_tracing();
        let (states, error) = trace_run(state);
        assert!(error.is_none());
        assert!(states.len() >= 3);
        assert_eq!(states.last().unwrap().code, Code::ReturnInt(5));
    }

    #[test]
    fn trace_run_stops_at_first_error() {
        let program = parse_program("define main = {} \\u {} -> bogus {}").unwrap();
        let state = compile(&program).unwrap();
        let (_states, error) = trace_run(state);
        assert!(matches!(error, Some(StgError::EnvLookupFailed { .. })));
    }
}
