//! Recursive-descent parser over the token stream produced by
//! [`crate::lexer`], in the shape of `ast::expression::Expression::from_pair`'s
//! per-node `from_pair`/`Rule`-dispatch constructors, but walking a
//! hand-rolled token stream rather than a `pest` parse tree: spec.md
//! §6's grammar is small enough that recursive descent over the
//! hand-rolled lexer's output is the more direct, idiomatic choice for
//! a from-scratch crate of this size (see DESIGN.md for the `pest`
//! drop rationale).

use crate::ast::*;
use crate::diagnostics::StgError;
use crate::lexer::{Lexer, Token, TokenKind};

pub fn parse_program(source: &str) -> Result<Program, StgError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

type PResult<T> = Result<T, StgError>;

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn position(&self) -> Position {
        self.peek().map(|t| t.position).unwrap_or((0, 0))
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        self.index += 1;
        token
    }

    fn expect(&mut self, expected: &TokenKind) -> PResult<Token> {
        match self.advance() {
            Some(token) if std::mem::discriminant(&token.kind) == std::mem::discriminant(expected) => {
                Ok(token)
            }
            other => Err(StgError::UnableToMkPrimInt {
                raw: format!("expected {expected:?}, found {other:?}"),
            }),
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, Position)> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Ident(name),
                position,
            }) => Ok((name, position)),
            other => Err(StgError::UnableToMkPrimInt {
                raw: format!("expected an identifier, found {other:?}"),
            }),
        }
    }

    fn parse_program(mut self) -> PResult<Program> {
        let mut bindings = Vec::new();
        while self.peek().is_some() {
            bindings.push(self.parse_binding()?);
            if matches!(self.peek_kind(), Some(TokenKind::Semicolon)) {
                self.advance();
            }
        }
        Ok(Program { bindings })
    }

    fn parse_binding(&mut self) -> PResult<Binding> {
        self.expect(&TokenKind::Define)?;
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::Eq)?;
        let lambda_form = self.parse_lambda_form()?;
        Ok(Binding { name, lambda_form })
    }

    fn parse_lambda_form(&mut self) -> PResult<LambdaForm> {
        let free_vars = self.parse_ident_list_in_braces()?;
        let update_flag = match self.advance() {
            Some(Token {
                kind: TokenKind::UpdateMarker(flag),
                ..
            }) => flag,
            other => {
                return Err(StgError::UnableToMkPrimInt {
                    raw: format!("expected an update marker (\\u or \\n), found {other:?}"),
                })
            }
        };
        let bound_vars = self.parse_ident_list_in_braces()?;
        self.expect(&TokenKind::Arrow)?;
        let body = self.parse_expression()?;
        Ok(LambdaForm {
            free_vars,
            update_flag,
            bound_vars,
            body,
        })
    }

    fn parse_ident_list_in_braces(&mut self) -> PResult<Vec<String>> {
        self.expect(&TokenKind::LBrace)?;
        let mut idents = Vec::new();
        if !matches!(self.peek_kind(), Some(TokenKind::RBrace)) {
            loop {
                let (name, _) = self.expect_ident()?;
                idents.push(name);
                if matches!(self.peek_kind(), Some(TokenKind::Comma)) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(idents)
    }

    fn parse_atom_list_in_braces(&mut self) -> PResult<Vec<Atom>> {
        self.expect(&TokenKind::LBrace)?;
        let mut atoms = Vec::new();
        if !matches!(self.peek_kind(), Some(TokenKind::RBrace)) {
            loop {
                atoms.push(self.parse_atom()?);
                if matches!(self.peek_kind(), Some(TokenKind::Comma)) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(atoms)
    }

    fn parse_atom(&mut self) -> PResult<Atom> {
        let position = self.position();
        match self.advance() {
            Some(Token {
                kind: TokenKind::Int(value),
                ..
            }) => Ok(Atom::Literal { value, position }),
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(Atom::Variable { name, position }),
            other => Err(StgError::UnableToMkPrimInt {
                raw: format!("expected an atom, found {other:?}"),
            }),
        }
    }

    /// Identifiers whose first character is uppercase name data
    /// constructors; everything else names a variable or intrinsic
    /// (DESIGN.md: constructor-vs-application disambiguation).
    fn is_constructor_name(name: &str) -> bool {
        name.chars().next().is_some_and(|c| c.is_uppercase())
    }

    fn parse_expression(&mut self) -> PResult<Expression> {
        let position = self.position();
        match self.peek_kind() {
            Some(TokenKind::Let) | Some(TokenKind::LetRec) => self.parse_let(),
            Some(TokenKind::Case) => self.parse_case(),
            Some(TokenKind::Int(_)) => {
                let atom_position = position;
                let Token {
                    kind: TokenKind::Int(value),
                    ..
                } = self.advance().unwrap()
                else {
                    unreachable!()
                };
                if matches!(self.peek_kind(), Some(tok) if is_binop_glyph(tok)) {
                    self.parse_binop_tail(Atom::Literal {
                        value,
                        position: atom_position,
                    })
                } else {
                    Ok(Expression::Int {
                        value,
                        position: atom_position,
                    })
                }
            }
            Some(TokenKind::Ident(_)) => self.parse_ident_led_expression(),
            other => Err(StgError::UnableToMkPrimInt {
                raw: format!("expected an expression, found {other:?}"),
            }),
        }
    }

    fn parse_ident_led_expression(&mut self) -> PResult<Expression> {
        let position = self.position();
        let (name, _) = self.expect_ident()?;

        if matches!(self.peek_kind(), Some(TokenKind::LBrace)) {
            let atoms = self.parse_atom_list_in_braces()?;
            return Ok(if Self::is_constructor_name(&name) {
                Expression::Constructor(Constructor {
                    name,
                    atoms,
                    position,
                })
            } else {
                Expression::FnApplication(FnApplication {
                    function: name,
                    args: atoms,
                    position,
                })
            });
        }

        if matches!(self.peek_kind(), Some(tok) if is_binop_glyph(tok)) {
            return self.parse_binop_tail(Atom::Variable { name, position });
        }

        Ok(Expression::FnApplication(FnApplication {
            function: name,
            args: vec![],
            position,
        }))
    }

    fn parse_binop_tail(&mut self, left: Atom) -> PResult<Expression> {
        let position = left.position();
        let op = match self.advance().map(|t| t.kind) {
            Some(TokenKind::Plus) => BinOp::Plus,
            Some(TokenKind::Minus) => BinOp::Minus,
            Some(TokenKind::Times) => BinOp::Times,
            Some(TokenKind::Divide) => BinOp::Divide,
            other => {
                return Err(StgError::UnableToMkPrimInt {
                    raw: format!("expected a binary operator, found {other:?}"),
                })
            }
        };
        let right = self.parse_atom()?;
        Ok(Expression::Binop(Binop {
            left,
            op,
            right,
            position,
        }))
    }

    fn parse_let(&mut self) -> PResult<Expression> {
        let position = self.position();
        let kind = match self.advance().map(|t| t.kind) {
            Some(TokenKind::Let) => LetKind::Let,
            Some(TokenKind::LetRec) => LetKind::LetRec,
            _ => unreachable!("parse_let called without let/letrec lookahead"),
        };

        let mut bindings = vec![self.parse_binding_without_define()?];
        while matches!(self.peek_kind(), Some(TokenKind::Semicolon)) {
            self.advance();
            bindings.push(self.parse_binding_without_define()?);
        }

        self.expect(&TokenKind::In)?;
        let body = Box::new(self.parse_expression()?);

        Ok(Expression::Let(Let {
            kind,
            bindings,
            body,
            position,
        }))
    }

    /// `let`/`letrec` bindings are written `name = lambda`, without the
    /// leading `define` keyword top-level bindings use.
    fn parse_binding_without_define(&mut self) -> PResult<Binding> {
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::Eq)?;
        let lambda_form = self.parse_lambda_form()?;
        Ok(Binding { name, lambda_form })
    }

    fn parse_case(&mut self) -> PResult<Expression> {
        let position = self.position();
        self.expect(&TokenKind::Case)?;
        let scrutinee = Box::new(self.parse_expression()?);
        self.expect(&TokenKind::Of)?;
        self.expect(&TokenKind::LBrace)?;

        let mut alternatives = vec![self.parse_case_alt()?];
        while matches!(self.peek_kind(), Some(TokenKind::Semicolon)) {
            self.advance();
            alternatives.push(self.parse_case_alt()?);
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(Expression::Case(Case {
            scrutinee,
            alternatives,
            position,
        }))
    }

    fn parse_case_alt(&mut self) -> PResult<CaseAlt> {
        let position = self.position();
        match self.peek_kind() {
            Some(TokenKind::Int(_)) => {
                let Some(Token {
                    kind: TokenKind::Int(value),
                    ..
                }) = self.advance()
                else {
                    unreachable!()
                };
                self.expect(&TokenKind::Arrow)?;
                let body = self.parse_expression()?;
                Ok(CaseAlt::Int {
                    value,
                    body,
                    position,
                })
            }
            Some(TokenKind::Ident(name)) if Self::is_constructor_name(name) => {
                let (name, _) = self.expect_ident()?;
                let bound_vars = self.parse_ident_list_in_braces()?;
                self.expect(&TokenKind::Arrow)?;
                let body = self.parse_expression()?;
                Ok(CaseAlt::Constructor {
                    name,
                    bound_vars,
                    body,
                    position,
                })
            }
            Some(TokenKind::Ident(_)) => {
                let (bound_var, _) = self.expect_ident()?;
                self.expect(&TokenKind::Arrow)?;
                let body = self.parse_expression()?;
                Ok(CaseAlt::Default {
                    bound_var,
                    body,
                    position,
                })
            }
            other => Err(StgError::UnableToMkPrimInt {
                raw: format!("expected a case alternative, found {other:?}"),
            }),
        }
    }
}

fn is_binop_glyph(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Plus | TokenKind::Minus | TokenKind::Times | TokenKind::Divide
    )
}
