//! Stack-based virtual machine for executing bytecode.

use std::io::{self, Write};

use crate::bytecode::chunk::Chunk;
use crate::bytecode::disassembler::{disassemble_chunk, disassemble_instruction};
use crate::bytecode::instruction::OpCode;
use crate::bytecode::value::{format_value, Value};
use crate::compiler;
use crate::error::RuntimeError;

/// Maximum stack size.
pub const STACK_MAX: usize = 256;

/// Result type for VM operations.
pub type VMResult<T> = Result<T, RuntimeError>;

/// Outcome of interpreting a program, mapped to a process exit code by the
/// driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    Ok,
    CompileError,
    RuntimeError,
}

impl InterpretResult {
    pub fn exit_code(self) -> i32 {
        match self {
            InterpretResult::Ok => 0,
            InterpretResult::CompileError => 65,
            InterpretResult::RuntimeError => 70,
        }
    }
}

/// Diagnostic switches for the VM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmOptions {
    /// Print the stack and each instruction before executing it.
    pub trace: bool,
    /// Print the compiled chunk before running it.
    pub disassemble: bool,
}

impl VmOptions {
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_disassemble(mut self, disassemble: bool) -> Self {
        self.disassemble = disassemble;
        self
    }
}

/// The virtual machine.
///
/// Program output (the printed result, disassembly and traces) goes to `out`;
/// diagnostics go to `err`.
pub struct VM<O: Write = io::Stdout, E: Write = io::Stderr> {
    stack: Vec<Value>,
    ip: usize,
    options: VmOptions,
    out: O,
    err: E,
}

impl VM {
    pub fn new() -> Self {
        Self::with_writers(io::stdout(), io::stderr())
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Write, E: Write> VM<O, E> {
    pub fn with_writers(out: O, err: E) -> Self {
        Self {
            stack: Vec::with_capacity(STACK_MAX),
            ip: 0,
            options: VmOptions::default(),
            out,
            err,
        }
    }

    pub fn with_options(mut self, options: VmOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> VmOptions {
        self.options
    }

    pub fn set_options(&mut self, options: VmOptions) {
        self.options = options;
    }

    pub fn output(&self) -> &O {
        &self.out
    }

    pub fn errors(&self) -> &E {
        &self.err
    }

    /// Compile and run `source`.
    pub fn interpret(&mut self, source: &str) -> InterpretResult {
        let mut chunk = Chunk::new();
        if let Err(errors) = compiler::compile(source, &mut chunk) {
            for error in &errors {
                let _ = writeln!(self.err, "{}", error);
            }
            return InterpretResult::CompileError;
        }

        if self.options.disassemble {
            let listing = disassemble_chunk(&chunk, "code");
            if let Err(e) = self.out.write_all(listing.as_bytes()) {
                let _ = writeln!(self.err, "{}", RuntimeError::from(e));
                return InterpretResult::RuntimeError;
            }
        }

        self.interpret_chunk(&chunk)
    }

    /// Run an already compiled chunk, reporting any fault to the error stream.
    pub fn interpret_chunk(&mut self, chunk: &Chunk) -> InterpretResult {
        match self.run(chunk) {
            Ok(_) => InterpretResult::Ok,
            Err(error) => {
                let _ = writeln!(self.err, "{}", error);
                InterpretResult::RuntimeError
            }
        }
    }

    /// Execute `chunk` until its return instruction and hand back the value
    /// it printed. The operand stack is empty again afterwards, whether the
    /// run succeeded or not.
    pub fn run(&mut self, chunk: &Chunk) -> VMResult<Value> {
        self.stack.clear();
        self.ip = 0;
        log::debug!("running chunk of {} byte(s)", chunk.len());

        let result = self.execute(chunk);
        self.stack.clear();
        result
    }

    /// Main execution loop.
    fn execute(&mut self, chunk: &Chunk) -> VMResult<Value> {
        loop {
            if self.options.trace {
                self.trace_instruction(chunk)?;
            }

            let byte = self.read_byte(chunk)?;
            let opcode = OpCode::from_u8(byte).ok_or_else(|| RuntimeError::InvalidOpcode {
                byte,
                line: self.current_line(chunk),
            })?;
            log::trace!("execute {:?} at offset {}", opcode, self.ip - 1);

            match opcode {
                OpCode::Constant => {
                    let index = self.read_byte(chunk)? as usize;
                    let value =
                        chunk
                            .constant_at(index)
                            .ok_or_else(|| RuntimeError::InvalidConstant {
                                index,
                                pool_size: chunk.constants().len(),
                                line: self.current_line(chunk),
                            })?;
                    self.push(value, chunk)?;
                }

                OpCode::Add => self.binary_op(chunk, |a, b| a + b)?,
                OpCode::Subtract => self.binary_op(chunk, |a, b| a - b)?,
                OpCode::Multiply => self.binary_op(chunk, |a, b| a * b)?,
                OpCode::Divide => self.binary_op(chunk, |a, b| a / b)?,

                OpCode::Negate => {
                    let value = self.pop(chunk)?;
                    self.push(-value, chunk)?;
                }

                OpCode::Return => {
                    let value = self.pop(chunk)?;
                    writeln!(self.out, "{}", format_value(value))?;
                    return Ok(value);
                }
            }
        }
    }

    fn read_byte(&mut self, chunk: &Chunk) -> VMResult<u8> {
        let Some(byte) = chunk.code_at(self.ip) else {
            return Err(RuntimeError::UnexpectedEnd {
                offset: self.ip,
                line: self.current_line(chunk),
            });
        };
        self.ip += 1;
        Ok(byte)
    }

    /// Line of the instruction byte most recently read.
    fn current_line(&self, chunk: &Chunk) -> u32 {
        chunk.line_at(self.ip.saturating_sub(1)).unwrap_or(0)
    }

    fn push(&mut self, value: Value, chunk: &Chunk) -> VMResult<()> {
        if self.stack.len() >= STACK_MAX {
            return Err(RuntimeError::StackOverflow {
                line: self.current_line(chunk),
            });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, chunk: &Chunk) -> VMResult<Value> {
        self.stack.pop().ok_or_else(|| RuntimeError::StackUnderflow {
            line: self.current_line(chunk),
        })
    }

    /// Pop the right operand, then the left, and push `op(left, right)`.
    fn binary_op<F>(&mut self, chunk: &Chunk, op: F) -> VMResult<()>
    where
        F: FnOnce(Value, Value) -> Value,
    {
        let b = self.pop(chunk)?;
        let a = self.pop(chunk)?;
        self.push(op(a, b), chunk)
    }

    fn trace_instruction(&mut self, chunk: &Chunk) -> VMResult<()> {
        let mut line = String::from("          ");
        for value in &self.stack {
            line.push_str(&format!("[ {} ]", format_value(*value)));
        }
        writeln!(self.out, "{}", line)?;

        if self.ip < chunk.len() {
            let mut instruction = String::new();
            disassemble_instruction(chunk, self.ip, &mut instruction);
            self.out.write_all(instruction.as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type TestVM = VM<Vec<u8>, Vec<u8>>;

    fn test_vm() -> TestVM {
        VM::with_writers(Vec::new(), Vec::new())
    }

    fn stdout_of(vm: &TestVM) -> String {
        String::from_utf8_lossy(vm.output()).into_owned()
    }

    fn stderr_of(vm: &TestVM) -> String {
        String::from_utf8_lossy(vm.errors()).into_owned()
    }

    fn eval(source: &str) -> String {
        let mut vm = test_vm();
        assert_eq!(vm.interpret(source), InterpretResult::Ok, "{}", stderr_of(&vm));
        stdout_of(&vm)
    }

    #[test]
    fn test_simple_arithmetic() {
        assert_eq!(eval("1 + 2"), "3\n");
        assert_eq!(eval("10 / 4"), "2.5\n");
        assert_eq!(eval("0.1 + 0.2"), "0.3\n");
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(eval("2 + 3 * 4"), "14\n");
        assert_eq!(eval("8 - 3 - 2"), "3\n");
        assert_eq!(eval("(2 + 3) * 4"), "20\n");
        assert_eq!(eval("-2 + 3"), "1\n");
        assert_eq!(eval("16 / 4 / 2"), "2\n");
        assert_eq!(eval("--3"), "3\n");
    }

    #[test]
    fn test_division_by_zero_follows_ieee() {
        assert_eq!(eval("1 / 0"), "inf\n");
        assert_eq!(eval("-1 / 0"), "-inf\n");
        assert_eq!(eval("0 / 0"), "nan\n");
        assert_eq!(eval("-(0 / 0)"), "nan\n");
    }

    #[test]
    fn test_compile_error_prints_nothing() {
        let mut vm = test_vm();
        assert_eq!(vm.interpret("1 +"), InterpretResult::CompileError);
        assert_eq!(stdout_of(&vm), "");
        assert_eq!(stderr_of(&vm), "[line 1] Error at end: Expect expression.\n");

        let mut vm = test_vm();
        assert_eq!(vm.interpret("(1 + 2"), InterpretResult::CompileError);
        assert_eq!(stdout_of(&vm), "");
    }

    #[test]
    fn test_hand_built_chunk() {
        let mut chunk = Chunk::new();
        let index = chunk.add_constant(1.2);
        chunk.write_op(OpCode::Constant, 123);
        chunk.write(index as u8, 123);
        chunk.write_op(OpCode::Return, 123);

        let mut vm = test_vm();
        assert_eq!(vm.run(&chunk).unwrap(), 1.2);
        assert_eq!(stdout_of(&vm), "1.2\n");
    }

    #[test]
    fn test_missing_return_is_runtime_error() {
        let mut chunk = Chunk::new();
        let index = chunk.add_constant(1.0);
        chunk.write_op(OpCode::Constant, 1);
        chunk.write(index as u8, 1);

        let mut vm = test_vm();
        let err = vm.run(&chunk).unwrap_err();
        assert!(matches!(err, RuntimeError::UnexpectedEnd { offset: 2, line: 1 }));
        assert_eq!(vm.interpret_chunk(&chunk), InterpretResult::RuntimeError);
        assert_eq!(
            stderr_of(&vm),
            "Instruction stream ended at offset 2 without a return.\n[line 1] in script\n"
        );

        assert!(matches!(
            vm.run(&Chunk::new()),
            Err(RuntimeError::UnexpectedEnd { offset: 0, line: 0 })
        ));
    }

    #[test]
    fn test_truncated_operand() {
        let mut chunk = Chunk::new();
        chunk.write_op(OpCode::Constant, 1);
        assert!(matches!(
            test_vm().run(&chunk),
            Err(RuntimeError::UnexpectedEnd { offset: 1, line: 1 })
        ));
    }

    #[test]
    fn test_invalid_opcode() {
        let mut chunk = Chunk::new();
        chunk.write(0xff, 4);
        assert!(matches!(
            test_vm().run(&chunk),
            Err(RuntimeError::InvalidOpcode { byte: 0xff, line: 4 })
        ));
    }

    #[test]
    fn test_invalid_constant_index() {
        let mut chunk = Chunk::new();
        chunk.write_op(OpCode::Constant, 2);
        chunk.write(3, 2);
        chunk.write_op(OpCode::Return, 2);
        assert!(matches!(
            test_vm().run(&chunk),
            Err(RuntimeError::InvalidConstant {
                index: 3,
                pool_size: 0,
                line: 2
            })
        ));
    }

    #[test]
    fn test_stack_underflow() {
        let mut chunk = Chunk::new();
        chunk.write_op(OpCode::Add, 9);
        let mut vm = test_vm();
        assert_eq!(vm.interpret_chunk(&chunk), InterpretResult::RuntimeError);
        assert_eq!(stderr_of(&vm), "Stack underflow.\n[line 9] in script\n");
    }

    #[test]
    fn test_stack_overflow() {
        let mut chunk = Chunk::new();
        let index = chunk.add_constant(1.0) as u8;
        for _ in 0..=STACK_MAX {
            chunk.write_op(OpCode::Constant, 1);
            chunk.write(index, 1);
        }
        chunk.write_op(OpCode::Return, 1);
        assert!(matches!(
            test_vm().run(&chunk),
            Err(RuntimeError::StackOverflow { line: 1 })
        ));
    }

    #[test]
    fn test_vm_is_reusable_after_fault() {
        let mut vm = test_vm();
        assert_eq!(vm.interpret_chunk(&Chunk::new()), InterpretResult::RuntimeError);
        assert_eq!(vm.interpret("6 * 7"), InterpretResult::Ok);
        assert_eq!(stdout_of(&vm), "42\n");
    }

    #[test]
    fn test_trace_output() {
        let mut vm = test_vm().with_options(VmOptions::default().with_trace(true));
        assert_eq!(vm.interpret("1 + 2"), InterpretResult::Ok);
        let out = stdout_of(&vm);
        assert!(out.contains("          [ 1 ][ 2 ]\n"));
        assert!(out.contains("OP_ADD"));
        assert!(out.ends_with("3\n"));
    }

    #[test]
    fn test_disassemble_option() {
        let mut vm = test_vm().with_options(VmOptions::default().with_disassemble(true));
        assert_eq!(vm.interpret("7"), InterpretResult::Ok);
        let out = stdout_of(&vm);
        assert!(out.starts_with("== code ==\n"));
        assert!(out.contains("OP_CONSTANT"));
        assert!(out.ends_with("7\n"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(InterpretResult::Ok.exit_code(), 0);
        assert_ne!(
            InterpretResult::CompileError.exit_code(),
            InterpretResult::RuntimeError.exit_code()
        );
    }
}
