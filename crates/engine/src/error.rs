//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`ExistingKey`] thrown when an item with the same key already exists.
//! - [`InvalidCredentials`] thrown when a login does not match a user.
//! - [`Storage`] and [`Serialization`] thrown when a document cannot be
//!   read or written.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InvalidCredentials`]: EngineError::InvalidCredentials
//!  [`Storage`]: EngineError::Storage
//!  [`Serialization`]: EngineError::Serialization
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Password(#[from] argon2::Error),
    #[error(transparent)]
    Export(#[from] csv::Error),
    #[error(transparent)]
    Blocking(#[from] tokio::task::JoinError),
}

impl EngineError {
    /// Returns `true` for failures of the underlying storage or encoders,
    /// i.e. everything the caller did not cause.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::Serialization(_)
                | Self::Password(_)
                | Self::Export(_)
                | Self::Blocking(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.kind() == b.kind(),
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Password(a), Self::Password(b)) => a.to_string() == b.to_string(),
            (Self::Export(a), Self::Export(b)) => a.to_string() == b.to_string(),
            (Self::Blocking(a), Self::Blocking(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
