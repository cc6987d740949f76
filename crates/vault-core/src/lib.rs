//! # vault-core
//!
//! Core functionality for Achievement Vault including:
//! - At-rest field encryption (scrypt key derivation + AES-256-GCM)
//! - Passthrough mode when no encryption key is configured
//! - Achievement and user storage with encrypted `title` / `coaching_response` fields

pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod storage;

pub use config::{CodecConfig, ENCRYPTION_KEY_VAR, ENVIRONMENT_VAR, LEGACY_ENVIRONMENT_VAR};
pub use crypto::{is_encoded, Decoded, DerivedKey, FallbackReason, FieldCodec, SecretString};
pub use error::{Result, VaultError};
pub use model::{Achievement, NewAchievement, NewUser, User};
pub use storage::{EncryptedStorage, JsonFileStorage, MemoryStorage, Storage};
