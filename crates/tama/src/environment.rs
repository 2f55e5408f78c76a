use crate::Result;
use std::{path::Path, rc::Rc};
use tama_bytecode::{Compiler, ExecutableProgram, Vm, VmSettings};
use tama_parser::{Ast, Parser};
use tama_runtime::{install_builtins, Interpreter, InterpreterSettings, Value};

/// The main interface for the Tama language
///
/// Wraps a persistent tree-walking [Interpreter] with the built-in functions
/// installed, so that declarations survive across evaluations.
///
/// Example:
///
/// ```
/// use tama::prelude::*;
///
/// fn main() -> tama::Result<()> {
///     let mut env = ScriptEnvironment::default();
///
///     match env.eval("fun add(a, b) { ret a + b; } ret add(3, 4);")? {
///         Value::Int(result) => assert_eq!(result, 7),
///         other => panic!("unexpected result: {other}"),
///     }
///
///     Ok(())
/// }
/// ```
pub struct ScriptEnvironment {
    interpreter: Interpreter,
}

impl Default for ScriptEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEnvironment {
    /// Creates an environment with default settings
    pub fn new() -> Self {
        Self::with_settings(InterpreterSettings::default())
    }

    /// Creates an environment with the given interpreter settings
    pub fn with_settings(settings: InterpreterSettings) -> Self {
        let mut interpreter = Interpreter::with_settings(settings);
        install_builtins(&mut interpreter);
        Self { interpreter }
    }

    /// Lexes, parses, and evaluates a script on the persistent interpreter
    pub fn eval(&mut self, source: &str) -> Result<Value> {
        let ast = parse(source)?;
        Ok(self.interpreter.execute(&ast)?)
    }

    /// Reads and evaluates a script file
    ///
    /// An absent or unreadable file yields `Ok(None)`.
    pub fn eval_file(&mut self, path: impl AsRef<Path>) -> Result<Option<Value>> {
        match std::fs::read_to_string(path) {
            Ok(source) => self.eval(&source).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Compiles a script to bytecode
    pub fn compile(&self, source: &str) -> Result<ExecutableProgram> {
        let ast = parse(source)?;
        Ok(Compiler::compile(&ast)?)
    }

    /// Compiles a script and runs it on a fresh bytecode VM
    ///
    /// The bytecode back end currently lowers a subset of the language;
    /// unsupported constructs surface as compile errors.
    pub fn eval_bytecode(&self, source: &str) -> Result<Value> {
        self.eval_bytecode_with_settings(source, VmSettings::default())
    }

    /// Compiles a script and runs it on a bytecode VM with the given settings
    pub fn eval_bytecode_with_settings(
        &self,
        source: &str,
        settings: VmSettings,
    ) -> Result<Value> {
        let program = self.compile(source)?;
        Ok(Vm::with_settings(settings).execute(&program)?)
    }

    /// The environment's persistent interpreter
    ///
    /// Useful for installing host functions and variables.
    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }
}

fn parse(source: &str) -> Result<Rc<Ast>> {
    Ok(Rc::new(Parser::parse(source)?))
}
