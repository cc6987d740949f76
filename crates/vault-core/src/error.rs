//! Error types for vault-core

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Data appears encrypted but ENCRYPTION_KEY is not set")]
    MissingKeyForEncodedData,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
