use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChurrosError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ChurrosError {
    fn from(e: serde_json::Error) -> Self {
        ChurrosError::Serialize(e.to_string())
    }
}
