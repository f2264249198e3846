use super::{ArgStack, Code, GlobalEnv, Heap, ReturnStack, UpdateStack};

/// The aggregate machine state: the three stacks, the heap, the global
/// environment, the current instruction, and an optional diagnostic log
/// (spec.md §3 "MachineState"). The log is only populated when the
/// driver is asked to trace; `run_to_final` never pays for it.
#[derive(Debug, Clone, Default)]
pub struct MachineState {
    pub code: Code,
    pub arg_stack: ArgStack,
    pub return_stack: ReturnStack,
    pub update_stack: UpdateStack,
    pub heap: Heap,
    pub globals: GlobalEnv,
    pub log: Option<Vec<String>>,
}

impl MachineState {
    pub fn with_tracing(mut self) -> Self {
        self.log = Some(Vec::new());
        self
    }

    pub fn record(&mut self, message: impl Into<String>) {
        if let Some(log) = &mut self.log {
            log.push(message.into());
        }
    }
}
