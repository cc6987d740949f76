//! Cryptographic primitives for at-rest field encryption
//!
//! This module provides:
//! - scrypt key derivation from the configured secret
//! - AES-256-GCM authenticated encryption with a self-describing hex format
//! - The field codec that switches between encryption and passthrough
//! - Secure memory handling with zeroize

mod codec;
mod encryption;
mod key_derivation;
mod secure_memory;

pub use codec::{Decoded, FallbackReason, FieldCodec, MIN_SECRET_LEN};
pub use encryption::{
    decrypt, decrypt_string, encrypt, encrypt_string, is_encoded, EncryptedData, IV_LEN, TAG_LEN,
};
pub use key_derivation::{derive_key, KeyDerivationParams, SALT};
pub use secure_memory::{DerivedKey, SecretString, KEY_LEN};
