//! Bytecode chunk containing instructions, line information and constants.

use crate::bytecode::instruction::OpCode;
use crate::bytecode::value::{Value, ValueArray};

/// A chunk of bytecode: the compilation target and the VM's input.
///
/// `lines` has one entry per byte of `code`, so the source line of any
/// offset is a direct lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    code: Vec<u8>,
    lines: Vec<u32>,
    constants: ValueArray,
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            code: Vec::new(),
            lines: Vec::new(),
            constants: ValueArray::new(),
        }
    }

    /// Write a raw byte to the chunk.
    pub fn write(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write an opcode to the chunk.
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.write(op.into(), line);
    }

    /// Add a constant to the pool and return its index.
    ///
    /// The index is not range checked; whoever encodes it into an
    /// instruction must make sure it fits the operand.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.write(value)
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    pub fn constants(&self) -> &ValueArray {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn code_at(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    pub fn constant_at(&self, index: usize) -> Option<Value> {
        self.constants.get(index)
    }

    /// Get the line number at a given offset.
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_track_every_byte() {
        let mut chunk = Chunk::new();
        let index = chunk.add_constant(1.2);
        chunk.write_op(OpCode::Constant, 123);
        chunk.write(index as u8, 123);
        chunk.write_op(OpCode::Return, 124);

        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.code().len(), chunk.lines().len());
        assert_eq!(chunk.code(), &[OpCode::Constant as u8, 0, OpCode::Return as u8]);
        assert_eq!(chunk.line_at(1), Some(123));
        assert_eq!(chunk.line_at(2), Some(124));
        assert_eq!(chunk.line_at(3), None);
    }

    #[test]
    fn test_constants_are_appended_not_deduplicated() {
        let mut chunk = Chunk::new();
        assert_eq!(chunk.add_constant(2.0), 0);
        assert_eq!(chunk.add_constant(2.0), 1);
        assert_eq!(chunk.constant_at(1), Some(2.0));
        assert_eq!(chunk.constant_at(2), None);
        assert_eq!(chunk.constants().len(), 2);
    }

    #[test]
    fn test_out_of_range_reads() {
        let chunk = Chunk::new();
        assert!(chunk.is_empty());
        assert_eq!(chunk.code_at(0), None);
        assert_eq!(chunk.constant_at(0), None);
    }

    #[test]
    fn test_chunk_can_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Chunk>();

        let mut chunk = Chunk::new();
        chunk.write_op(OpCode::Return, 1);
        let len = std::thread::spawn(move || chunk.len()).join().unwrap();
        assert_eq!(len, 1);
    }
}
