//! A collection of useful items to make it easier to work with `tama`

#[doc(inline)]
pub use crate::{Error, Result, ScriptEnvironment};
#[doc(inline)]
pub use tama_runtime::{
    install_builtins, CaptureOutput, Function, HostFunction, Interpreter, InterpreterSettings,
    ScriptOutput, Value, ValueKey, ValueMap,
};
