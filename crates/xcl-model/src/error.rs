use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("numeric indicator not \"0\", \"1\" or \"2\": {0}")]
    InvalidMode(String),
    #[error("unknown criteria phase: {0}")]
    InvalidPhase(String),
    #[error("range bound must be numeric or \"None\": {0}")]
    InvalidRangeBound(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
