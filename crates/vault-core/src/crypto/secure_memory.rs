//! Key material wrappers with automatic zeroization

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the derived AES-256 key in bytes
pub const KEY_LEN: usize = 32;

/// Symmetric key derived from the configured secret - zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Raw key bytes. Never log or persist these.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Operator-supplied secret material - zeroed when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Length in UTF-16 code units, the unit stored keys were validated in
    pub fn utf16_len(&self) -> usize {
        self.value.encode_utf16().count()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
