//! Runic: a one-pass bytecode compiler and stack virtual machine for
//! numeric expressions.
//!
//! Source text is scanned on demand by [`lexer::Scanner`], compiled straight
//! into a [`bytecode::Chunk`] by [`compiler::Compiler`] with no syntax tree
//! in between, and executed by [`bytecode::VM`].
//!
//! ```
//! use runic::{interpret, InterpretResult};
//!
//! assert_eq!(interpret("(2 + 3) * 4"), InterpretResult::Ok);
//! ```

pub mod bytecode;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod repl;

pub use bytecode::{Chunk, InterpretResult, Value, VmOptions, VM};
use error::RunicError;

/// Compile and run `source`, printing the result to stdout and diagnostics
/// to stderr.
pub fn interpret(source: &str) -> InterpretResult {
    VM::new().interpret(source)
}

/// Compile source code to bytecode without executing.
pub fn compile(source: &str) -> Result<Chunk, RunicError> {
    let mut chunk = Chunk::new();
    compiler::compile(source, &mut chunk)?;
    Ok(chunk)
}

/// Compile and run source code, returning the value it printed.
pub fn evaluate(source: &str) -> Result<Value, RunicError> {
    let chunk = compile(source)?;
    let value = VM::new().run(&chunk)?;
    Ok(value)
}

/// Disassemble compiled bytecode to a string.
pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    bytecode::disassemble_chunk(chunk, name)
}

/// Read a script from disk and interpret it.
pub fn run_file(path: &std::path::Path, options: VmOptions) -> Result<InterpretResult, RunicError> {
    let source = std::fs::read_to_string(path)?;
    log::debug!("read {} byte(s) from {}", source.len(), path.display());
    Ok(VM::new().with_options(options).interpret(&source))
}
