use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("Not signed in")]
    Unauthenticated,
    #[error("Backend request failed: {0}")]
    Network(String),
    #[error("Receipt upload failed: {0}")]
    Upload(String),
}
