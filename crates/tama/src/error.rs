use thiserror::Error;

/// The different error types that can result from
/// [ScriptEnvironment](crate::ScriptEnvironment) operations
#[derive(Error, Clone, Debug)]
pub enum Error {
    /// A parse failure, recoverable at the host boundary
    ///
    /// Carries a message and the offending token.
    #[error(transparent)]
    ParseError(#[from] tama_parser::Error),
    /// A failure while lowering a script to bytecode
    #[error("{0}")]
    CompileError(String),
    /// A fatal runtime failure
    #[error(transparent)]
    RuntimeError(#[from] tama_runtime::Error),
}

// Compile errors hold the offending AST node, which isn't Send + Sync,
// so the message is rendered to a String at this boundary.
impl From<tama_bytecode::CompilerError> for Error {
    fn from(error: tama_bytecode::CompilerError) -> Self {
        Self::CompileError(error.to_string())
    }
}

/// The Result type returned by [ScriptEnvironment](crate::ScriptEnvironment) operations
pub type Result<T> = std::result::Result<T, Error>;
