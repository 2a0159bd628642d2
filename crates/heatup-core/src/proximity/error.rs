use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProximityError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
