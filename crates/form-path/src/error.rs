use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("UNRESOLVED_PLACEHOLDER: {0}")]
    UnresolvedPlaceholder(String),
    #[error("NOT_CONTAINER: {0}")]
    NotContainer(String),
}
