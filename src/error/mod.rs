//! Error types for compilation and execution.

use std::fmt;

use thiserror::Error;

/// Where in the source a compile error was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    /// At the end of input.
    AtEnd,
    /// At a specific token, identified by its lexeme.
    AtLexeme(String),
    /// Reported by the scanner; the message already describes the problem.
    Unlocated,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLocation::AtEnd => write!(f, " at end"),
            ErrorLocation::AtLexeme(lexeme) => write!(f, " at '{}'", lexeme),
            ErrorLocation::Unlocated => Ok(()),
        }
    }
}

/// A compile-time diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct CompileError {
    pub line: u32,
    pub location: ErrorLocation,
    pub message: String,
}

impl CompileError {
    pub fn new(line: u32, location: ErrorLocation, message: impl Into<String>) -> Self {
        Self {
            line,
            location,
            message: message.into(),
        }
    }
}

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Stack underflow.\n[line {line}] in script")]
    StackUnderflow { line: u32 },

    #[error("Stack overflow.\n[line {line}] in script")]
    StackOverflow { line: u32 },

    #[error("Unknown opcode {byte}.\n[line {line}] in script")]
    InvalidOpcode { byte: u8, line: u32 },

    #[error("Constant index {index} is outside the pool of {pool_size}.\n[line {line}] in script")]
    InvalidConstant {
        index: usize,
        pool_size: usize,
        line: u32,
    },

    #[error("Instruction stream ended at offset {offset} without a return.\n[line {line}] in script")]
    UnexpectedEnd { offset: usize, line: u32 },

    #[error("Failed to write result: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Source line the fault is attributed to, when known.
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::StackUnderflow { line }
            | Self::StackOverflow { line }
            | Self::InvalidOpcode { line, .. }
            | Self::InvalidConstant { line, .. }
            | Self::UnexpectedEnd { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }
}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum RunicError {
    #[error("{}", render_compile_errors(.0))]
    Compile(Vec<CompileError>),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Vec<CompileError>> for RunicError {
    fn from(errors: Vec<CompileError>) -> Self {
        Self::Compile(errors)
    }
}

fn render_compile_errors(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
