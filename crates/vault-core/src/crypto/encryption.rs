//! AES-256-GCM authenticated encryption of field values
//!
//! Stored format: `{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`
//! - IV: 16 bytes (32 hex chars)
//! - Auth tag: 16 bytes (32 hex chars)
//! - Ciphertext: variable length, same byte length as the UTF-8 plaintext
//!
//! There is no version marker. Values are recognised by shape alone, so this
//! layout must stay stable for as long as stored data exists.

use aes_gcm::{
    aead::{consts::U16, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm, Nonce, Tag,
};
use rand::RngCore;

use super::secure_memory::DerivedKey;
use crate::error::{Result, VaultError};

/// AES-256-GCM with a 128-bit IV
type FieldCipher = AesGcm<Aes256, U16>;

pub const IV_LEN: usize = 16;
pub const TAG_LEN: usize = 16;
pub const IV_HEX_LEN: usize = IV_LEN * 2;
pub const TAG_HEX_LEN: usize = TAG_LEN * 2;

/// Returns true if `text` has the shape of an encoded value.
///
/// Shape only: three `:`-separated segments, the first two exactly 32
/// characters long. Nothing is decoded, so a plaintext that happens to fit
/// the shape is reported as encoded.
pub fn is_encoded(text: &str) -> bool {
    let mut parts = text.split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(iv), Some(tag), Some(_), None) => iv.len() == IV_HEX_LEN && tag.len() == TAG_HEX_LEN,
        _ => false,
    }
}

/// Encrypted field with IV and detached auth tag
#[derive(Debug, Clone)]
pub struct EncryptedData {
    pub iv: [u8; IV_LEN],
    pub auth_tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Display for EncryptedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            hex::encode(self.iv),
            hex::encode(self.auth_tag),
            hex::encode(&self.ciphertext)
        )
    }
}

impl EncryptedData {
    /// Parse from the format: `{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`
    pub fn from_string(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(VaultError::Decryption(
                "Invalid encrypted data format: expected iv:tag:ciphertext".to_string(),
            ));
        }

        let mut iv = [0u8; IV_LEN];
        hex::decode_to_slice(parts[0], &mut iv)
            .map_err(|e| VaultError::Decryption(format!("Invalid IV hex: {}", e)))?;

        let mut auth_tag = [0u8; TAG_LEN];
        hex::decode_to_slice(parts[1], &mut auth_tag)
            .map_err(|e| VaultError::Decryption(format!("Invalid auth tag hex: {}", e)))?;

        let ciphertext = hex::decode(parts[2])
            .map_err(|e| VaultError::Decryption(format!("Invalid ciphertext hex: {}", e)))?;

        Ok(Self {
            iv,
            auth_tag,
            ciphertext,
        })
    }
}

/// Encrypt plaintext under a fresh random IV
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> Result<EncryptedData> {
    let cipher = FieldCipher::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let mut iv = [0u8; IV_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let mut ciphertext = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut ciphertext)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(tag.as_slice());

    Ok(EncryptedData {
        iv,
        auth_tag,
        ciphertext,
    })
}

/// Verify the auth tag and decrypt
pub fn decrypt(encrypted: &EncryptedData, key: &DerivedKey) -> Result<Vec<u8>> {
    let cipher = FieldCipher::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Decryption(e.to_string()))?;

    let mut plaintext = encrypted.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(&encrypted.iv),
            b"",
            &mut plaintext,
            Tag::<U16>::from_slice(&encrypted.auth_tag),
        )
        .map_err(|e| VaultError::Decryption(e.to_string()))?;

    Ok(plaintext)
}

/// Encrypt a string and return the stored format
pub fn encrypt_string(plaintext: &str, key: &DerivedKey) -> Result<String> {
    let encrypted = encrypt(plaintext.as_bytes(), key)?;
    Ok(encrypted.to_string())
}

/// Decrypt from the stored format and return as string
pub fn decrypt_string(encrypted_str: &str, key: &DerivedKey) -> Result<String> {
    let encrypted = EncryptedData::from_string(encrypted_str)?;
    let plaintext = decrypt(&encrypted, key)?;
    String::from_utf8(plaintext)
        .map_err(|e| VaultError::Decryption(format!("Invalid UTF-8: {}", e)))
}
