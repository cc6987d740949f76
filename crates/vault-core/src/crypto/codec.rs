//! Field encryption codec
//!
//! Sits between the storage layer and the cipher. With a usable secret
//! configured it encrypts on the way in and decrypts on the way out; without
//! one it passes values through untouched. Reads never fail because of
//! cryptography: anything that cannot be decrypted is handed back as stored.

use std::sync::OnceLock;

use tracing::{debug, error, warn};

use super::encryption::{decrypt_string, encrypt_string, is_encoded};
use super::key_derivation::derive_key;
use super::secure_memory::DerivedKey;
use crate::config::CodecConfig;
use crate::error::{Result, VaultError};

/// Minimum secret length (in UTF-16 code units) for encryption to be enabled
pub const MIN_SECRET_LEN: usize = 32;

/// Why a shape-matching value was returned without being decrypted
#[derive(Debug)]
pub enum FallbackReason {
    /// No usable secret is configured
    MissingKey,
    /// Key derivation, hex parsing or tag verification failed
    Decryption(VaultError),
}

/// Outcome of [`FieldCodec::decode`].
///
/// Every variant carries a usable string; the variant records how it was
/// obtained.
#[derive(Debug)]
pub enum Decoded {
    /// Input did not have the encoded shape and was returned as-is
    Plain(String),
    /// Input was decrypted successfully
    Decrypted(String),
    /// Input looked encoded but could not be decrypted; returned as stored
    Passthrough {
        stored: String,
        reason: FallbackReason,
    },
}

impl Decoded {
    pub fn as_str(&self) -> &str {
        match self {
            Decoded::Plain(value) | Decoded::Decrypted(value) => value,
            Decoded::Passthrough { stored, .. } => stored,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Decoded::Plain(value) | Decoded::Decrypted(value) => value,
            Decoded::Passthrough { stored, .. } => stored,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Decoded::Passthrough { .. })
    }
}

/// Encrypts and decrypts individual text fields for storage
pub struct FieldCodec {
    config: CodecConfig,
    key: OnceLock<DerivedKey>,
}

impl FieldCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            key: OnceLock::new(),
        }
    }

    /// True iff a secret is configured and is at least [`MIN_SECRET_LEN`]
    /// UTF-16 code units long
    pub fn is_active(&self) -> bool {
        self.config
            .secret_material
            .as_ref()
            .is_some_and(|secret| secret.utf16_len() >= MIN_SECRET_LEN)
    }

    /// Warn when running in production without encryption. Never fatal.
    ///
    /// Returns whether encryption is active.
    pub fn validate_startup(&self) -> bool {
        let active = self.is_active();
        if self.config.is_production && !active {
            warn!(
                "ENCRYPTION_KEY is not set in production. Achievement data will not be encrypted."
            );
        }
        active
    }

    /// Derived key, computed on first use.
    ///
    /// Concurrent first callers may each derive; the first stored key wins and
    /// the others are dropped. Derivation is deterministic so this is harmless.
    pub fn derived_key(&self) -> Result<&DerivedKey> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }

        let secret = self.config.secret_material.as_ref().ok_or_else(|| {
            VaultError::Configuration("ENCRYPTION_KEY not set".to_string())
        })?;

        let key = derive_key(secret.expose(), self.config.kdf)?;
        debug!("Derived field encryption key");

        let _ = self.key.set(key);
        self.key
            .get()
            .ok_or_else(|| VaultError::KeyDerivation("key cache is empty".to_string()))
    }

    /// Produce the storable form of `plaintext`.
    ///
    /// Identity when encryption is inactive. Otherwise `iv:tag:ciphertext`
    /// under a fresh random IV, so encoding the same text twice gives
    /// different outputs.
    pub fn encode(&self, plaintext: &str) -> Result<String> {
        if !self.is_active() {
            return Ok(plaintext.to_string());
        }

        let key = self.derived_key()?;
        encrypt_string(plaintext, key)
    }

    /// Recover the plaintext from a stored value. Never fails outwardly.
    pub fn decode(&self, stored: &str) -> Decoded {
        if !is_encoded(stored) {
            return Decoded::Plain(stored.to_string());
        }

        if !self.is_active() {
            warn!("{}", VaultError::MissingKeyForEncodedData);
            return Decoded::Passthrough {
                stored: stored.to_string(),
                reason: FallbackReason::MissingKey,
            };
        }

        match self
            .derived_key()
            .and_then(|key| decrypt_string(stored, key))
        {
            Ok(plaintext) => Decoded::Decrypted(plaintext),
            Err(e) => {
                error!("Decryption failed: {}", e);
                Decoded::Passthrough {
                    stored: stored.to_string(),
                    reason: FallbackReason::Decryption(e),
                }
            }
        }
    }

    /// [`decode`](Self::decode) collapsed to the usable string
    pub fn decode_to_string(&self, stored: &str) -> String {
        self.decode(stored).into_string()
    }
}

impl std::fmt::Debug for FieldCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCodec")
            .field("active", &self.is_active())
            .field("is_production", &self.config.is_production)
            .field("key_cached", &self.key.get().is_some())
            .finish()
    }
}
