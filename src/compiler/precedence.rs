//! Operator precedence and the parse rule table for Pratt parsing.

use crate::bytecode::OpCode;
use crate::lexer::TokenKind;

/// Operator precedence levels (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    Assignment = 1, // =
    Or = 2,         // or
    And = 3,        // and
    Equality = 4,   // == !=
    Comparison = 5, // < > <= >=
    Term = 6,       // + -
    Factor = 7,     // * /
    Unary = 8,      // ! -
    Call = 9,       // . ()
    Primary = 10,
}

impl Precedence {
    pub fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call => Precedence::Primary,
            Precedence::Primary => Precedence::Primary,
        }
    }
}

/// Arithmetic operators that compile to a single binary instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn opcode(self) -> OpCode {
        match self {
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Subtract => OpCode::Subtract,
            BinaryOp::Multiply => OpCode::Multiply,
            BinaryOp::Divide => OpCode::Divide,
        }
    }
}

/// The handler invoked for a token in prefix or infix position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFn {
    Number,
    Grouping,
    Unary,
    Binary(BinaryOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRule {
    pub prefix: Option<ParseFn>,
    pub infix: Option<ParseFn>,
    pub precedence: Precedence,
}

impl ParseRule {
    const NONE: ParseRule = ParseRule::new(None, None, Precedence::None);

    const fn new(prefix: Option<ParseFn>, infix: Option<ParseFn>, precedence: Precedence) -> Self {
        Self {
            prefix,
            infix,
            precedence,
        }
    }
}

/// Look up the parse rule for a token kind.
pub fn get_rule(kind: TokenKind) -> ParseRule {
    use ParseFn::*;

    match kind {
        TokenKind::LeftParen => ParseRule::new(Some(Grouping), None, Precedence::None),
        TokenKind::Minus => ParseRule::new(
            Some(Unary),
            Some(Binary(BinaryOp::Subtract)),
            Precedence::Term,
        ),
        TokenKind::Plus => ParseRule::new(None, Some(Binary(BinaryOp::Add)), Precedence::Term),
        TokenKind::Slash => {
            ParseRule::new(None, Some(Binary(BinaryOp::Divide)), Precedence::Factor)
        }
        TokenKind::Star => {
            ParseRule::new(None, Some(Binary(BinaryOp::Multiply)), Precedence::Factor)
        }
        TokenKind::Number => ParseRule::new(Some(Number), None, Precedence::None),
        _ => ParseRule::NONE,
    }
}
