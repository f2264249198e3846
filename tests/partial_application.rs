//! spec.md §8 "Partial application rewrites closure" (rule 17,
//! spec.md §4.3.6): entering `flip tuple` with too few arguments rewrites
//! the forcing thunk into a closure that absorbs the supplied argument,
//! and a later call with the remaining arguments completes the
//! application in the right order.

use stg_machine::ast::{Atom, Constructor, FnApplication, LambdaForm, UpdateFlag};
use stg_machine::evaluator::{step, StepOutcome};
use stg_machine::machine::{Closure, Code, GlobalEnv, Heap, MachineState, Value};

fn var(name: &str) -> Atom {
    Atom::Variable {
        name: name.into(),
        position: (0, 0),
    }
}

#[test]
fn partial_application_rewrites_closure_and_completes_on_further_arguments() {
    let mut heap = Heap::new();
    let mut globals = GlobalEnv::new();

    let tuple_lambda = LambdaForm {
        free_vars: vec![],
        update_flag: UpdateFlag::NoUpdate,
        bound_vars: vec!["a".into(), "b".into()],
        body: stg_machine::ast::Expression::Constructor(Constructor {
            name: "Tup".into(),
            atoms: vec![var("a"), var("b")],
            position: (0, 0),
        }),
    };
    let tuple_addr = heap.allocate(Closure::new(tuple_lambda, vec![]));
    globals.insert("tuple".into(), tuple_addr);

    let flip_lambda = LambdaForm {
        free_vars: vec![],
        update_flag: UpdateFlag::NoUpdate,
        bound_vars: vec!["f".into(), "x".into(), "y".into()],
        body: stg_machine::ast::Expression::FnApplication(FnApplication {
            function: "f".into(),
            args: vec![var("y"), var("x")],
            position: (0, 0),
        }),
    };
    let flip_addr = heap.allocate(Closure::new(flip_lambda, vec![]));
    globals.insert("flip".into(), flip_addr);

    let main_lambda = LambdaForm {
        free_vars: vec![],
        update_flag: UpdateFlag::Updatable,
        bound_vars: vec![],
        body: stg_machine::ast::Expression::FnApplication(FnApplication {
            function: "flip".into(),
            args: vec![var("tuple")],
            position: (0, 0),
        }),
    };
    let main_addr = heap.allocate(Closure::new(main_lambda, vec![]));
    globals.insert("main".into(), main_addr);

    let mut state = MachineState {
        code: Code::Enter(main_addr),
        heap,
        globals,
        ..MachineState::default()
    };

    // Drive until `flip` is entered with only `tuple` on the stack.
    loop {
        if let Code::Enter(addr) = &state.code {
            if *addr == flip_addr {
                break;
            }
        }
        step(&mut state).unwrap();
    }
    step(&mut state).unwrap(); // rule 17 rewrite of `main`'s heap slot into a PAP

    // Re-enter `main`'s rewritten slot with the remaining arguments.
    state.arg_stack.set(vec![]);
    state
        .arg_stack
        .push_call_args(vec![Value::PrimInt(1), Value::PrimInt(2)]);
    state.return_stack.set(vec![]);
    state.code = Code::Enter(main_addr);
    loop {
        if step(&mut state).unwrap() == StepOutcome::Halted {
            break;
        }
    }

    assert_eq!(
        state.code,
        Code::ReturnConstructor("Tup".into(), vec![Value::PrimInt(2), Value::PrimInt(1)])
    );
}
