use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid user data format: {0}")]
    DataIntegrity(String),

    #[error("Gone: {0}")]
    Gone(String),

    #[error("Database schema error: {0}")]
    SchemaError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}
