//! Single-pass compiler: parses tokens and emits bytecode directly.
//!
//! There is no syntax tree. The compiler pulls tokens from the [`Scanner`]
//! on demand and writes instructions into the destination [`Chunk`] as each
//! construct is recognized, using Pratt-style precedence climbing.

mod expressions;
pub mod precedence;


use crate::bytecode::{Chunk, OpCode};
use crate::error::{CompileError, ErrorLocation};
use crate::lexer::{Scanner, Token, TokenKind};

pub use precedence::{BinaryOp, ParseFn, ParseRule, Precedence};

/// Result type for compilation: all diagnostics are returned on failure.
pub type CompileResult = Result<(), Vec<CompileError>>;

/// Largest constant index a single-byte operand can encode.
pub const MAX_CONSTANT_INDEX: usize = u8::MAX as usize;

/// Deepest nesting of sub-expressions accepted before reporting an error.
pub const MAX_NESTING: usize = 200;

/// Compile `source` into `chunk`.
///
/// On failure the chunk's contents are unspecified and should be discarded.
pub fn compile(source: &str, chunk: &mut Chunk) -> CompileResult {
    Compiler::new(source, chunk).compile()
}

/// The compiler state for one compilation unit.
pub struct Compiler<'src, 'chunk> {
    scanner: Scanner<'src>,
    current: Token<'src>,
    previous: Token<'src>,
    chunk: &'chunk mut Chunk,
    had_error: bool,
    panic_mode: bool,
    errors: Vec<CompileError>,
    depth: usize,
}

impl<'src, 'chunk> Compiler<'src, 'chunk> {
    pub fn new(source: &'src str, chunk: &'chunk mut Chunk) -> Self {
        Self {
            scanner: Scanner::new(source),
            current: Token::eof(1),
            previous: Token::eof(1),
            chunk,
            had_error: false,
            panic_mode: false,
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Compile a single expression followed by end of input.
    pub fn compile(mut self) -> CompileResult {
        self.advance();
        self.expression();
        self.consume(TokenKind::Eof, "Expect end of expression.");
        self.end_compiler();

        if self.had_error {
            log::debug!("compilation failed with {} error(s)", self.errors.len());
            Err(self.errors)
        } else {
            log::debug!(
                "compiled {} byte(s), {} constant(s)",
                self.chunk.len(),
                self.chunk.constants().len()
            );
            Ok(())
        }
    }

    fn end_compiler(&mut self) {
        self.emit_op(OpCode::Return);
    }

    // ===== Token manipulation =====

    pub(crate) fn advance(&mut self) {
        self.previous = self.current;

        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            let message = self.current.lexeme;
            self.error_at_current(message);
        }
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Require the current token to be `kind`. A successful match ends panic
    /// mode, since the parser is back on a known token boundary.
    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
            self.panic_mode = false;
            return;
        }

        self.error_at_current(message);
    }

    // ===== Emission =====

    pub(crate) fn emit_byte(&mut self, byte: u8) {
        self.chunk.write(byte, self.previous.line);
    }

    pub(crate) fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op.into());
    }

    pub(crate) fn emit_constant(&mut self, value: f64) {
        let index = self.make_constant(value);
        self.emit_op(OpCode::Constant);
        self.emit_byte(index);
    }

    fn make_constant(&mut self, value: f64) -> u8 {
        let index = self.chunk.add_constant(value);
        if index > MAX_CONSTANT_INDEX {
            self.error("Too many constants in one chunk.");
            return 0;
        }
        index as u8
    }

    // ===== Diagnostics =====

    pub(crate) fn error_at_current(&mut self, message: &str) {
        let token = self.current;
        self.error_at(token, message);
    }

    pub(crate) fn error(&mut self, message: &str) {
        let token = self.previous;
        self.error_at(token, message);
    }

    fn error_at(&mut self, token: Token<'_>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;

        let location = match token.kind {
            TokenKind::Eof => ErrorLocation::AtEnd,
            TokenKind::Error => ErrorLocation::Unlocated,
            _ => ErrorLocation::AtLexeme(token.lexeme.to_string()),
        };
        self.errors.push(CompileError::new(token.line, location, message));
    }
}
