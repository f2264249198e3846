use std::fmt::{self, Display, Formatter};

/// Opaque heap index. Addresses are never reused; allocation is
/// append-only (spec.md §3 "Address").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(pub usize);

impl Display for Addr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Either an address into the heap or a primitive integer (spec.md §3
/// "Value"). Lives on the argument stack, inside closure free-variable
/// slots, and inside local environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Addr(Addr),
    PrimInt(i64),
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Addr(addr) => write!(f, "{addr}"),
            Value::PrimInt(n) => write!(f, "{n}"),
        }
    }
}
