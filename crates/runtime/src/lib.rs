//! Contains the value model and tree-walking interpreter for the Tama language

#![warn(missing_docs)]

mod builtins;
mod error;
mod function;
mod interpreter;
mod io;
mod scope;
mod value;
mod value_key;

pub mod prelude;

pub use crate::{
    builtins::install_builtins,
    error::{Error, ErrorKind, Result},
    function::{Function, FunctionBody, FunctionParameter, HostFunction},
    interpreter::{Interpreter, InterpreterSettings},
    io::{CaptureOutput, DefaultStdout, OutputHandle, ScriptOutput},
    scope::{Scope, ScopeKind, ValueCell, Variable},
    value::{Value, ValueHasher, ValueMap},
    value_key::ValueKey,
};
