use crate::diagnostics::StgError;

use super::{Addr, Closure};

/// An append-addressed mapping from addresses to closures (spec.md §4.1).
/// Closures are never deallocated; addresses are never reused, matching
/// the "heap grows monotonically" non-goal (no GC).
#[derive(Debug, Clone, Default)]
pub struct Heap {
    closures: Vec<Closure>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.closures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }

    /// Appends `closure` and returns its fresh address. O(1).
    pub fn allocate(&mut self, closure: Closure) -> Addr {
        let addr = Addr(self.closures.len());
        self.closures.push(closure);
        addr
    }

    pub fn lookup(&self, addr: Addr) -> Result<&Closure, StgError> {
        self.closures
            .get(addr.0)
            .ok_or(StgError::HeapLookupFailed { addr })
    }

    /// Overwrites the closure at `addr`. Fails if `addr` was never
    /// allocated — updating is rewriting an existing binding, never
    /// creating a new one.
    pub fn update(&mut self, addr: Addr, closure: Closure) -> Result<(), StgError> {
        let slot = self
            .closures
            .get_mut(addr.0)
            .ok_or(StgError::HeapUpdateHasNoPreviousValue { addr })?;
        *slot = closure;
        Ok(())
    }
}
