use tama_lexer::Token;
use thiserror::Error;

/// An error that represents a problem with the Parser's internal logic, rather than a user error
#[derive(Error, Clone, Debug)]
#[allow(missing_docs)]
pub enum InternalError {
    #[error("there are more nodes in the program than the AST can support")]
    AstCapacityOverflow,
}

/// A syntax error encountered by the [Parser](crate::Parser)
#[derive(Error, Clone, Debug)]
#[allow(missing_docs)]
pub enum SyntaxError {
    #[error("cannot mix array and object notation")]
    MixedArrayAndObject,
    #[error("expected ')' at the end of the argument list")]
    ExpectedCallArgsEnd,
    #[error("expected ')' after a nested expression")]
    ExpectedCloseParen,
    #[error("expected an expression")]
    ExpectedExpression,
    #[error("expected a declaration in the for loop")]
    ExpectedForDeclaration,
    #[error("expected '(' after 'for'")]
    ExpectedForParenOpen,
    #[error("expected ')' at the end of the for loop header")]
    ExpectedForParenClose,
    #[error("expected a body for the function")]
    ExpectedFunctionBody,
    #[error("expected '(' at the start of the parameter list")]
    ExpectedFunctionParenOpen,
    #[error("expected a body for the if branch")]
    ExpectedIfBody,
    #[error("expected '(' after 'if'")]
    ExpectedIfParenOpen,
    #[error("expected ')' after the if condition")]
    ExpectedIfParenClose,
    #[error("expected a body for the loop")]
    ExpectedLoopBody,
    #[error("expected ']' at the end of an array or object")]
    ExpectedBracketClose,
    #[error("expected an identifier in the parameter list")]
    ExpectedParameterName,
    #[error("expected ')' at the end of the parameter list")]
    ExpectedParameterListEnd,
    #[error("expected '}}' at the end of a block")]
    ExpectedScopeEnd,
    #[error("expected '=' after the variable name")]
    ExpectedVarAssignment,
    #[error("expected an identifier after 'var'")]
    ExpectedVarName,
    #[error("number is out of range")]
    InvalidNumber,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("unsupported binary operator")]
    UnsupportedBinaryOperator,
}

/// See [`Error`]
#[derive(Error, Clone, Debug)]
#[allow(missing_docs)]
pub enum ErrorKind {
    #[error(transparent)]
    InternalError(#[from] InternalError),
    #[error(transparent)]
    SyntaxError(#[from] SyntaxError),
}

/// An error that can be produced by the [Parser](crate::Parser)
///
/// Carries the offending token, whose span locates the error in the source.
#[derive(Error, Clone, Debug)]
#[error("{error} - {}:{}", token.span.start.line + 1, token.span.start.column + 1)]
pub struct Error {
    /// The error itself
    pub error: ErrorKind,
    /// The token that triggered the error
    pub token: Token,
}

impl Error {
    /// Initializes a parser error with the specific error type and the offending token
    pub fn new(error: ErrorKind, token: Token) -> Self {
        Self { error, token }
    }
}

/// The result type used by the [Parser](crate::Parser)
pub type Result<T> = std::result::Result<T, Error>;
