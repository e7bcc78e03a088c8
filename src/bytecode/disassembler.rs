//! Bytecode disassembler for debugging.

use std::fmt::{self, Write};

use crate::bytecode::chunk::Chunk;
use crate::bytecode::instruction::OpCode;
use crate::bytecode::value::format_value;

/// Disassemble a chunk into human-readable output under a `== name ==`
/// header.
pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_chunk(chunk, name, &mut output);
    output
}

/// Disassemble a single instruction, returning the offset of the next one.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize, output: &mut String) -> usize {
    write_instruction(chunk, offset, output).unwrap_or(offset + 1)
}

/// Print disassembly to stdout.
pub fn print_disassembly(chunk: &Chunk, name: &str) {
    print!("{}", disassemble_chunk(chunk, name));
}

fn write_chunk<W: Write>(chunk: &Chunk, name: &str, output: &mut W) -> Result<(), fmt::Error> {
    writeln!(output, "== {} ==", name)?;

    let mut offset = 0;
    while offset < chunk.len() {
        offset = write_instruction(chunk, offset, output)?;
    }
    Ok(())
}

fn write_instruction<W: Write>(
    chunk: &Chunk,
    offset: usize,
    output: &mut W,
) -> Result<usize, fmt::Error> {
    write!(output, "{:04} ", offset)?;

    // Line number, or | when unchanged from the previous byte
    let line = chunk.line_at(offset);
    if offset > 0 && line == chunk.line_at(offset - 1) {
        write!(output, "   | ")?;
    } else {
        write!(output, "{:4} ", line.unwrap_or(0))?;
    }

    let Some(byte) = chunk.code_at(offset) else {
        writeln!(output, "<end of code>")?;
        return Ok(offset + 1);
    };
    let Some(opcode) = OpCode::from_u8(byte) else {
        writeln!(output, "Unknown opcode {}", byte)?;
        return Ok(offset + 1);
    };

    match opcode {
        OpCode::Constant => constant_instruction(opcode, chunk, offset, output),
        OpCode::Add
        | OpCode::Subtract
        | OpCode::Multiply
        | OpCode::Divide
        | OpCode::Negate
        | OpCode::Return => {
            writeln!(output, "{}", opcode.mnemonic())?;
            Ok(offset + 1)
        }
    }
}

fn constant_instruction<W: Write>(
    opcode: OpCode,
    chunk: &Chunk,
    offset: usize,
    output: &mut W,
) -> Result<usize, fmt::Error> {
    let next = offset + 1 + opcode.operand_width();
    let Some(index) = chunk.code_at(offset + 1) else {
        writeln!(output, "{:<16} <truncated>", opcode.mnemonic())?;
        return Ok(next);
    };

    match chunk.constant_at(index as usize) {
        Some(value) => writeln!(
            output,
            "{:<16} {:4} '{}'",
            opcode.mnemonic(),
            index,
            format_value(value)
        )?,
        None => writeln!(output, "{:<16} {:4} (invalid)", opcode.mnemonic(), index)?,
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use pretty_assertions::assert_eq;

    fn disassemble_source(source: &str) -> String {
        let mut chunk = Chunk::new();
        compile(source, &mut chunk).unwrap();
        disassemble_chunk(&chunk, "code")
    }

    #[test]
    fn test_disassemble_simple() {
        assert_eq!(
            disassemble_source("1.2"),
            "== code ==\n\
             0000    1 OP_CONSTANT         0 '1.2'\n\
             0002    | OP_RETURN\n"
        );
    }

    #[test]
    fn test_disassemble_multiline() {
        let output = disassemble_source("1 +\n2 * 3");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "0000    1 OP_CONSTANT         0 '1'");
        assert_eq!(lines[2], "0002    2 OP_CONSTANT         1 '2'");
        assert_eq!(lines[3], "0004    | OP_CONSTANT         2 '3'");
        assert_eq!(lines[4], "0006    | OP_MULTIPLY");
        assert_eq!(lines[5], "0007    | OP_ADD");
        assert_eq!(lines[6], "0008    | OP_RETURN");
    }

    #[test]
    fn test_constant_matches_vm_output() {
        let source = "0.333333333";
        let listing = disassemble_source(source);

        let mut vm = crate::bytecode::VM::with_writers(Vec::new(), Vec::new());
        vm.interpret(source);
        let printed = String::from_utf8_lossy(vm.output()).trim_end().to_string();

        assert!(listing.contains(&format!("'{}'", printed)));
    }

    #[test]
    fn test_malformed_chunk() {
        let mut chunk = Chunk::new();
        chunk.write(0xee, 1);
        chunk.write_op(OpCode::Constant, 1);
        chunk.write(9, 1);
        chunk.write_op(OpCode::Constant, 2);

        let output = disassemble_chunk(&chunk, "bad");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "0000    1 Unknown opcode 238");
        assert_eq!(lines[2], "0001    | OP_CONSTANT         9 (invalid)");
        assert_eq!(lines[3], "0003    2 OP_CONSTANT      <truncated>");
    }

    #[test]
    fn test_disassemble_instruction_advances() {
        let mut chunk = Chunk::new();
        chunk.add_constant(5.0);
        chunk.write_op(OpCode::Constant, 1);
        chunk.write(0, 1);
        chunk.write_op(OpCode::Negate, 1);

        let mut output = String::new();
        assert_eq!(disassemble_instruction(&chunk, 0, &mut output), 2);
        assert_eq!(disassemble_instruction(&chunk, 2, &mut output), 3);
        assert!(output.ends_with("OP_NEGATE\n"));
    }
}
