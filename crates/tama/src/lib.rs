//! # Tama
//!
//! Pulls together the parser, tree-walking interpreter, and bytecode back end
//! for the Tama scripting language.
//!
//! Scripts are evaluated with the [ScriptEnvironment] struct.

#![warn(missing_docs)]

mod environment;
mod error;
pub mod prelude;

pub use tama_bytecode as bytecode;
pub use tama_parser as parser;
pub use tama_runtime as runtime;

pub use crate::{
    environment::ScriptEnvironment,
    error::{Error, Result},
};
