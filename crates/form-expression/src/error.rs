use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("PARSE_ERROR at {pos}: {msg}")]
    Parse { pos: usize, msg: String },

    #[error("MAX_DEPTH_EXCEEDED")]
    DepthExceeded,

    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error("{0}")]
    Arity(String),

    #[error("UNKNOWN_METHOD: {0}")]
    UnknownMethod(String),

    #[error("UNKNOWN_FUNCTION: {0}")]
    UnknownFunction(String),

    #[error("INVALID_REGEX: {0}")]
    InvalidRegex(String),
}

impl ExpressionError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ExpressionError::Parse { .. } | ExpressionError::DepthExceeded)
    }
}
