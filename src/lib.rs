//! # stg-machine
//!
//! An interpreter for the Spineless Tagless G-machine (STG), the abstract
//! machine underlying compiled lazy functional programs (Peyton Jones,
//! 1992). Given STG source text, [`parser`] and [`ast`] produce an AST,
//! [`compiler`] loads it into an initial [`machine::MachineState`],
//! and [`evaluator`]/[`driver`] step the machine to completion.

pub mod ast;
pub mod compiler;
pub mod diagnostics;
pub mod driver;
pub mod evaluator;
pub mod lexer;
pub mod machine;
pub mod parser;
pub mod pretty;
