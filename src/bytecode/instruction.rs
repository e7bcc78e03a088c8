//! Bytecode instruction definitions for the Runic VM.

/// Opcodes for the bytecode virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Load a constant from the constant pool: CONSTANT <index:u8>
    Constant = 0,
    /// Add two values: a + b
    Add,
    /// Subtract two values: a - b
    Subtract,
    /// Multiply two values: a * b
    Multiply,
    /// Divide two values: a / b
    Divide,
    /// Negate a value: -a
    Negate,
    /// Print the value on top of the stack and halt
    Return,
}

impl OpCode {
    pub fn from_u8(byte: u8) -> Option<OpCode> {
        let op = match byte {
            0 => OpCode::Constant,
            1 => OpCode::Add,
            2 => OpCode::Subtract,
            3 => OpCode::Multiply,
            4 => OpCode::Divide,
            5 => OpCode::Negate,
            6 => OpCode::Return,
            _ => return None,
        };
        Some(op)
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_width(self) -> usize {
        match self {
            OpCode::Constant => 1,
            _ => 0,
        }
    }

    /// Name used in disassembly listings.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Constant => "OP_CONSTANT",
            OpCode::Add => "OP_ADD",
            OpCode::Subtract => "OP_SUBTRACT",
            OpCode::Multiply => "OP_MULTIPLY",
            OpCode::Divide => "OP_DIVIDE",
            OpCode::Negate => "OP_NEGATE",
            OpCode::Return => "OP_RETURN",
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_byte_round_trip() {
        for byte in 0..=u8::MAX {
            if let Some(op) = OpCode::from_u8(byte) {
                assert_eq!(u8::from(op), byte);
            }
        }
        assert_eq!(OpCode::from_u8(7), None);
    }

    #[test]
    fn test_operand_widths() {
        assert_eq!(OpCode::Constant.operand_width(), 1);
        assert_eq!(OpCode::Return.operand_width(), 0);
    }
}
