use crate::ast::{Position, UpdateFlag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Let,
    LetRec,
    In,
    Case,
    Of,
    Define,
    UpdateMarker(UpdateFlag),
    Arrow,
    FatArrow,
    Eq,
    Semicolon,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Times,
    Divide,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}
