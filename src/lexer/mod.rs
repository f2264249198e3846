//! Tokenizer for STG source text (spec.md §6). Out of the core's scope
//! per spec.md §1, but implemented here so the crate is self-contained;
//! the evaluator core never depends on lexer internals.
//!
//! Identifier continuation characters extend spec.md §6's
//! `[A-Za-z][A-Za-z0-9_\-?]*` with a trailing `#`, since spec.md's own
//! worked examples (§8) name the `plus#` intrinsic, which that regex
//! cannot lex as written (see DESIGN.md).

mod token;

pub use token::*;

use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::ast::Position;
use crate::diagnostics::StgError;

/// Maximal-munch table of multi-character glyphs, tried longest-first
/// so `->` is not mistaken for two single-char tokens, in the shape of
/// `LEX_MAP`'s `can_match`/`get` pair.
static GLYPHS: Lazy<Vec<(&'static str, TokenKind)>> = Lazy::new(|| {
    vec![
        ("->", TokenKind::Arrow),
        ("=>", TokenKind::FatArrow),
        ("=", TokenKind::Eq),
        (";", TokenKind::Semicolon),
        ("{", TokenKind::LBrace),
        ("}", TokenKind::RBrace),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        (",", TokenKind::Comma),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("*", TokenKind::Times),
        ("/", TokenKind::Divide),
    ]
});

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("let", TokenKind::Let);
    m.insert("letrec", TokenKind::LetRec);
    m.insert("in", TokenKind::In);
    m.insert("case", TokenKind::Case);
    m.insert("of", TokenKind::Of);
    m.insert("define", TokenKind::Define);
    m
});

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn position(&self) -> Position {
        (self.line, self.col)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn eat_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            if self.chars.peek() == Some(&'#') {
                while !matches!(self.chars.peek(), None | Some('\n')) {
                    self.bump();
                }
                continue;
            }
            break;
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, StgError> {
        let mut tokens = Vec::new();
        loop {
            self.eat_whitespace_and_comments();
            let Some(&next) = self.chars.peek() else {
                break;
            };
            let token = match next {
                'A'..='Z' | 'a'..='z' => self.lex_ident_or_keyword(),
                '0'..='9' => self.lex_int()?,
                '\\' => self.lex_update_marker()?,
                _ => self.lex_glyph()?,
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let position = self.position();
        let mut value = String::new();
        while matches!(self.chars.peek(), Some(c) if c.is_alphanumeric() || matches!(*c, '_' | '-' | '?' | '#'))
        {
            value.push(self.bump().unwrap());
        }
        let kind = KEYWORDS
            .get(value.as_str())
            .cloned()
            .unwrap_or(TokenKind::Ident(value));
        Token { kind, position }
    }

    fn lex_int(&mut self) -> Result<Token, StgError> {
        let position = self.position();
        let mut raw = String::new();
        while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
            raw.push(self.bump().unwrap());
        }
        let value = raw
            .parse::<i64>()
            .map_err(|_| StgError::UnableToMkPrimInt { raw: raw.clone() })?;
        Ok(Token {
            kind: TokenKind::Int(value),
            position,
        })
    }

    fn lex_update_marker(&mut self) -> Result<Token, StgError> {
        let position = self.position();
        self.bump(); // '\\'
        match self.bump() {
            Some('u') => Ok(Token {
                kind: TokenKind::UpdateMarker(crate::ast::UpdateFlag::Updatable),
                position,
            }),
            Some('n') => Ok(Token {
                kind: TokenKind::UpdateMarker(crate::ast::UpdateFlag::NoUpdate),
                position,
            }),
            other => Err(StgError::UnableToMkPrimInt {
                raw: format!("\\{}", other.unwrap_or(' ')),
            }),
        }
    }

    fn lex_glyph(&mut self) -> Result<Token, StgError> {
        let position = self.position();
        // Longest-match-first: try two-char glyphs before falling back
        // to one-char ones.
        let mut two = String::new();
        two.push(*self.chars.peek().unwrap());
        let rest_peek = {
            let mut cloned = self.chars.clone();
            cloned.next();
            cloned.peek().copied()
        };
        if let Some(c2) = rest_peek {
            two.push(c2);
            if let Some((_, kind)) = GLYPHS.iter().find(|(glyph, _)| *glyph == two) {
                self.bump();
                self.bump();
                return Ok(Token {
                    kind: kind.clone(),
                    position,
                });
            }
        }
        let one = two.chars().next().unwrap().to_string();
        if let Some((_, kind)) = GLYPHS.iter().find(|(glyph, _)| *glyph == one) {
            self.bump();
            return Ok(Token {
                kind: kind.clone(),
                position,
            });
        }
        Err(StgError::UnableToMkPrimInt {
            raw: format!("unrecognised glyph '{one}'"),
        })
    }
}
