use super::{Atom, Binding, CaseAlt, Position};

/// A saturated data constructor application, e.g. `Cons {x, xs}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub name: String,
    pub atoms: Vec<Atom>,
    pub position: Position,
}

/// The binary operators that appear in source syntax (spec.md §6 glyphs).
/// Desaturated into a primitive intrinsic call by the evaluator (spec.md
/// §9, first open question) rather than lowered away at parse time, so
/// the AST variant below stays a faithful, directly-evaluable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Plus,
    Minus,
    Times,
    Divide,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binop {
    pub left: Atom,
    pub op: BinOp,
    pub right: Atom,
    pub position: Position,
}

/// `f {a1, ..., an}` — apply a variable (bound to a closure address, or
/// the name of an intrinsic) to atomic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnApplication {
    pub function: String,
    pub args: Vec<Atom>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetKind {
    Let,
    LetRec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Let {
    pub kind: LetKind,
    pub bindings: Vec<Binding>,
    pub body: Box<Expression>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub scrutinee: Box<Expression>,
    pub alternatives: Vec<CaseAlt>,
    pub position: Position,
}

/// spec.md §3 "Expression".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    FnApplication(FnApplication),
    Let(Let),
    Case(Case),
    Constructor(Constructor),
    Int { value: i64, position: Position },
    Binop(Binop),
}

impl Expression {
    pub fn position(&self) -> Position {
        match self {
            Expression::FnApplication(FnApplication { position, .. })
            | Expression::Let(Let { position, .. })
            | Expression::Case(Case { position, .. })
            | Expression::Constructor(Constructor { position, .. })
            | Expression::Int { position, .. }
            | Expression::Binop(Binop { position, .. }) => *position,
        }
    }
}
