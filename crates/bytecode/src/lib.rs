//! Contains the bytecode compiler and VM used by the Tama language

#![warn(missing_docs)]

mod compiler;
mod instruction;
mod program;
mod vm;

pub use crate::{
    compiler::{Compiler, CompilerError, ErrorKind, Result as CompilerResult},
    instruction::{Instruction, Register},
    program::{Block, BlockKind, ExecutableProgram},
    vm::{Vm, VmSettings},
};
