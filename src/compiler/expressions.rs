//! Expression parsing and code generation.

use crate::bytecode::OpCode;
use crate::compiler::precedence::{get_rule, ParseFn, Precedence};
use crate::compiler::{Compiler, MAX_NESTING};
use crate::lexer::TokenKind;

impl<'src, 'chunk> Compiler<'src, 'chunk> {
    pub(crate) fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    /// Parse an expression whose operators bind at least as tightly as
    /// `precedence`.
    pub(crate) fn parse_precedence(&mut self, precedence: Precedence) {
        if self.depth >= MAX_NESTING {
            self.error_at_current("Expression nests too deeply.");
            return;
        }
        self.depth += 1;

        self.advance();
        match get_rule(self.previous.kind).prefix {
            Some(prefix) => {
                self.apply(prefix);

                while precedence <= get_rule(self.current.kind).precedence {
                    self.advance();
                    if let Some(infix) = get_rule(self.previous.kind).infix {
                        self.apply(infix);
                    }
                }
            }
            None => self.error("Expect expression."),
        }

        self.depth -= 1;
    }

    /// Dispatch a parse rule handler.
    fn apply(&mut self, handler: ParseFn) {
        match handler {
            ParseFn::Number => self.number(),
            ParseFn::Grouping => self.grouping(),
            ParseFn::Unary => self.unary(),
            ParseFn::Binary(op) => self.binary(op.opcode()),
        }
    }

    fn number(&mut self) {
        match self.previous.lexeme.parse::<f64>() {
            Ok(value) => self.emit_constant(value),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self) {
        let operator = self.previous.kind;

        // Compile the operand first; the operator applies to its result.
        self.parse_precedence(Precedence::Unary);

        if operator == TokenKind::Minus {
            self.emit_op(OpCode::Negate);
        }
    }

    fn binary(&mut self, op: OpCode) {
        let rule = get_rule(self.previous.kind);

        // One level higher keeps equal-precedence operators left-associative.
        self.parse_precedence(rule.precedence.next());

        self.emit_op(op);
    }
}
