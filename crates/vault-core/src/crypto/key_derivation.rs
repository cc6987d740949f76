//! Secret-to-key derivation using scrypt

use scrypt::Params;

use super::secure_memory::{DerivedKey, KEY_LEN};
use crate::error::{Result, VaultError};

/// Fixed salt every stored value was encrypted under
pub const SALT: &str = "achievement-salt";

/// Parameters for scrypt key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDerivationParams {
    /// log2 of the CPU/memory cost N (default: 14, N = 16384)
    pub log_n: u8,
    /// Block size (default: 8)
    pub r: u32,
    /// Parallelism (default: 1)
    pub p: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            log_n: 14,
            r: 8,
            p: 1,
        }
    }
}

/// Derive the 256-bit field key from the configured secret and [`SALT`].
///
/// Deterministic: the same secret and parameters always yield the same key,
/// which is what keeps previously stored values decodable.
pub fn derive_key(secret: &str, params: KeyDerivationParams) -> Result<DerivedKey> {
    derive_key_with_salt(secret, SALT.as_bytes(), params)
}

pub(crate) fn derive_key_with_salt(
    secret: &str,
    salt: &[u8],
    params: KeyDerivationParams,
) -> Result<DerivedKey> {
    let scrypt_params = Params::new(params.log_n, params.r, params.p, KEY_LEN)
        .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;

    let mut key_bytes = [0u8; KEY_LEN];
    scrypt::scrypt(secret.as_bytes(), salt, &scrypt_params, &mut key_bytes)
        .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;

    Ok(DerivedKey::new(key_bytes))
}
