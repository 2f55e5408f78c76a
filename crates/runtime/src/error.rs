use thiserror::Error;

/// The different error types that can be thrown by the Tama runtime
#[derive(Error, Clone, Debug)]
#[allow(missing_docs)]
pub enum ErrorKind {
    #[error("{0}")]
    StringError(String),
    #[error("cannot cast {from} to {to}")]
    BadValueCast {
        from: &'static str,
        to: &'static str,
    },
    #[error("unimplemented operation: '{op}' between {lhs} and {rhs}")]
    UnimplementedOperation {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("io error: {0}")]
    IoError(String),
}

/// An error thrown by the Tama runtime
#[derive(Error, Clone, Debug)]
#[error("{error}")]
pub struct Error {
    /// The error itself
    pub error: ErrorKind,
}

impl Error {
    /// Initializes an error with the given internal error type
    pub fn new(error: ErrorKind) -> Self {
        Self { error }
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Self::new(ErrorKind::StringError(error))
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Self::new(ErrorKind::StringError(error.into()))
    }
}

impl From<ErrorKind> for Error {
    fn from(error: ErrorKind) -> Self {
        Self::new(error)
    }
}

/// The Result type used by the Tama runtime
pub type Result<T> = std::result::Result<T, Error>;

/// Creates an [Error] from a message (with format-like behaviour), wrapped in `Err`
#[macro_export]
macro_rules! runtime_error {
    ($error:literal) => {
        Err($crate::Error::from(format!($error)))
    };
    ($error:expr) => {
        Err($crate::Error::from($error))
    };
    ($error:literal, $($y:expr),+ $(,)?) => {
        Err($crate::Error::from(format!($error, $($y),+)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_error_macro_formats_messages() {
        let result: Result<()> = runtime_error!("unexpected value: {}", 42);
        let error = result.unwrap_err();
        assert!(matches!(error.error, ErrorKind::StringError(message) if message == "unexpected value: 42"));
    }

    #[test]
    fn error_kinds_display() {
        let error = Error::new(ErrorKind::UnimplementedOperation {
            op: "+",
            lhs: "array",
            rhs: "array",
        });
        assert_eq!(
            error.to_string(),
            "unimplemented operation: '+' between array and array"
        );
    }
}
