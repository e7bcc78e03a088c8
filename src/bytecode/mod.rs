//! Bytecode module for the Runic VM.
//!
//! # Architecture
//!
//! - `value`: The numeric value type and the constant pool
//! - `instruction`: OpCode definitions for the bytecode instruction set
//! - `chunk`: Bytecode chunks containing instructions, lines and constants
//! - `vm`: Stack-based virtual machine for executing bytecode
//! - `disassembler`: Debug output for bytecode inspection
//!
//! The compiler that fills chunks lives in [`crate::compiler`].

pub mod chunk;
pub mod disassembler;
pub mod instruction;
pub mod value;
pub mod vm;

pub use chunk::Chunk;
pub use disassembler::{disassemble_chunk, disassemble_instruction, print_disassembly};
pub use instruction::OpCode;
pub use value::{format_value, Value, ValueArray};
pub use vm::{InterpretResult, VmOptions, VM};
