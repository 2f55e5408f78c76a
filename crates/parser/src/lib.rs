//! Contains the parser and AST format used by the Tama language

#![warn(missing_docs)]

mod ast;
mod error;
mod node;
mod parser;

pub use crate::{
    ast::{Ast, AstIndex, AstNode},
    error::{Error, ErrorKind, InternalError, Result, SyntaxError},
    node::*,
    parser::Parser,
};
pub use tama_lexer::{Position, Span};
