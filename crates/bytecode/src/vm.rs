use crate::{
    instruction::{Instruction, Register},
    program::ExecutableProgram,
};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tama_runtime::{DefaultStdout, OutputHandle, Result, Value};

/// Settings used to control the behaviour of the bytecode [Vm]
pub struct VmSettings {
    /// When enabled, each executed instruction writes a one-line trace with
    /// its disassembly and the accumulator's formatted form
    pub trace: bool,
    /// The stream that trace output is written to
    pub output: OutputHandle,
}

impl Default for VmSettings {
    fn default() -> Self {
        Self {
            trace: false,
            output: Rc::new(DefaultStdout),
        }
    }
}

// A block being executed, and the index of its current instruction
struct Frame {
    block: usize,
    pc: usize,
}

/// The bytecode interpreter
///
/// A fetch-decode-execute loop over an [ExecutableProgram]'s blocks, with an
/// accumulator, an indexed register file, a global variable table, an operand
/// stack, and a call-frame stack.
pub struct Vm {
    accumulator: Value,
    registers: Vec<Value>,
    variables: FxHashMap<Rc<str>, Value>,
    stack: Vec<Value>,
    frames: Vec<Frame>,
    // At most one of each may be pending, consumed between instructions
    pending_jump: Option<usize>,
    pending_call: Option<usize>,
    settings: VmSettings,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Creates a VM with default settings
    pub fn new() -> Self {
        Self::with_settings(VmSettings::default())
    }

    /// Creates a VM with the given settings
    pub fn with_settings(settings: VmSettings) -> Self {
        Self {
            accumulator: Value::Undefined,
            registers: Vec::new(),
            variables: FxHashMap::default(),
            stack: Vec::new(),
            frames: Vec::new(),
            pending_jump: None,
            pending_call: None,
            settings,
        }
    }

    /// The accumulator's current value
    pub fn accumulator(&self) -> &Value {
        &self.accumulator
    }

    /// Returns a copy of a variable's value, Undefined when absent
    pub fn variable(&self, name: &str) -> Value {
        self.variables.get(name).cloned().unwrap_or_default()
    }

    /// Executes a program starting at its `main` block
    ///
    /// The accumulator's final value is returned. A missing entry block
    /// yields Undefined.
    pub fn execute(&mut self, program: &ExecutableProgram) -> Result<Value> {
        self.execute_block(program, "main")
    }

    /// Executes a program starting at the named block
    pub fn execute_block(&mut self, program: &ExecutableProgram, entry: &str) -> Result<Value> {
        let Some(entry_block) = program.block_index_by_name(entry) else {
            return Ok(Value::Undefined);
        };
        self.frames.push(Frame {
            block: entry_block,
            pc: 0,
        });

        // The loop ends when the frame stack empties, or when the top frame's
        // pc passes its block's end
        loop {
            let Some(frame) = self.frames.last() else {
                break;
            };
            let Some(block) = program.blocks().get(frame.block) else {
                break;
            };
            let Some(instruction) = block.instructions().get(frame.pc) else {
                break;
            };

            if self.settings.trace {
                self.settings.output.write_line(&format!(
                    "{:<20}\t\t\tacc={}",
                    instruction.to_string(),
                    self.accumulator.to_formatted_string()
                ))?;
            }

            let frame_count = self.frames.len();
            self.execute_instruction(instruction, program)?;

            // A `ret` popped the frame; control is already at the caller's
            // next instruction
            if self.frames.len() != frame_count {
                continue;
            }

            if let Some(frame) = self.frames.last_mut() {
                frame.pc += 1;
            }

            if let Some(target) = self.pending_jump.take() {
                if let Some(frame) = self.frames.last_mut() {
                    frame.pc = target;
                }
            } else if let Some(block) = self.pending_call.take() {
                self.frames.push(Frame { block, pc: 0 });
            }
        }

        self.frames.clear();
        Ok(self.accumulator.clone())
    }

    fn execute_instruction(
        &mut self,
        instruction: &Instruction,
        program: &ExecutableProgram,
    ) -> Result<()> {
        use Instruction::*;

        match instruction {
            Load(register) => self.accumulator = self.register_value(*register),
            LoadImmediate(value) => self.accumulator = value.clone(),
            LoadVariable(name) => self.accumulator = self.variable(name),
            Store(register) => self.set_register(*register, self.accumulator.clone()),
            StoreVariable(name) => {
                self.variables.insert(name.clone(), self.accumulator.clone());
            }
            Add(register) => {
                self.accumulator = self.accumulator.add(&self.register_value(*register))?;
            }
            Sub(register) => {
                self.accumulator = self.register_value(*register).subtract(&self.accumulator)?;
            }
            Mul(register) => {
                self.accumulator = self.register_value(*register).multiply(&self.accumulator)?;
            }
            Div(register) => {
                self.accumulator = self.register_value(*register).divide(&self.accumulator)?;
            }
            Push => self.stack.push(self.accumulator.clone()),
            Pop => self.accumulator = self.stack.pop().unwrap_or_default(),
            // Unknown block names leave the call pending slot empty,
            // making the call a no-op
            Call(name) => self.pending_call = program.block_index_by_name(name),
            Jump(target) => self.pending_jump = Some(*target),
            JumpIfFalse(target) => {
                if !self.accumulator.is_trueish() {
                    self.pending_jump = Some(*target);
                }
            }
            Ret => {
                self.frames.pop();
            }
        }

        Ok(())
    }

    fn register_value(&self, register: Register) -> Value {
        self.registers
            .get(register as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn set_register(&mut self, register: Register, value: Value) {
        let index = register as usize;
        if index >= self.registers.len() {
            self.registers.resize(index + 1, Value::Undefined);
        }
        self.registers[index] = value;
    }
}
