//! Contains the lexer used by the Tama language

#![warn(missing_docs)]

mod lexer;
mod span;

pub use crate::{
    lexer::{
        is_id_continue, is_id_start, CommentPolicy, Lexer, Token, TokenKind, WhitespacePolicy,
        KEYWORDS,
    },
    span::{Position, Span},
};
