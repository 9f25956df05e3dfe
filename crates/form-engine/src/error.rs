use form_path::PathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("INVALID_DEFINITION: {0}")]
    Definition(#[from] serde_json::Error),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("INVALID_OPTIONS: {0}")]
    Options(String),

    #[error("INVALID_SCHEMA: {0}")]
    Schema(String),

    #[error("NOT_AN_ARRAY: {0}")]
    NotAnArray(String),

    #[error("OUT_OF_BOUNDS: {index} (length {len})")]
    OutOfBounds { index: usize, len: usize },
}
