//! A collection of useful items to make it easier to work with `tama_runtime`

#[doc(inline)]
pub use crate::{
    install_builtins, CaptureOutput, DefaultStdout, Error, ErrorKind, Function, FunctionBody,
    FunctionParameter, HostFunction, Interpreter, InterpreterSettings, OutputHandle, Result,
    Scope, ScopeKind, ScriptOutput, Value, ValueCell, ValueKey, ValueMap, Variable,
};
