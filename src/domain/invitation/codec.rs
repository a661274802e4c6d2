//! Invitation token codec
//!
//! Tokens are AES-256-GCM sealed identifiers laid out as
//! `base64(nonce[12] || tag[16] || ciphertext)` with the standard padded
//! alphabet. The ciphertext length equals the plaintext length.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Key, Nonce, Tag,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Nonce length in bytes (96 bits)
pub const NONCE_LEN: usize = 12;
/// Authentication tag length in bytes (128 bits)
pub const TAG_LEN: usize = 16;
/// Fixed per-token overhead: nonce plus tag
pub const HEADER_LEN: usize = NONCE_LEN + TAG_LEN;
/// Key length in bytes (256 bits)
pub const KEY_LEN: usize = 32;

/// Codec failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Not base64, shorter than nonce plus tag, or not UTF-8 after opening
    #[error("malformed invitation token")]
    MalformedToken,

    /// Tag verification failed: corrupted, truncated, forged, or wrong key
    #[error("invitation token failed authentication")]
    Authentication,

    /// Key material is not 256 bits
    #[error("invitation key must be {KEY_LEN} bytes")]
    InvalidKey,

    #[error("invitation token encryption failed")]
    Encryption,
}

/// 256-bit symmetric key for sealing invitation tokens
///
/// The key bytes are wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct InvitationKey([u8; KEY_LEN]);

impl InvitationKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a provisioned secret
    ///
    /// Accepts the standard base64 encoding of 32 bytes, or a raw secret
    /// that is itself exactly 32 bytes long.
    pub fn from_secret(secret: &str) -> Result<Self, CodecError> {
        let secret = secret.trim();

        if let Ok(mut decoded) = STANDARD.decode(secret) {
            if decoded.len() == KEY_LEN {
                let key = Self::from_slice(&decoded);
                decoded.zeroize();
                return key;
            }
            decoded.zeroize();
        }

        if secret.len() == KEY_LEN {
            return Self::from_slice(secret.as_bytes());
        }

        Err(CodecError::InvalidKey)
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CodecError::InvalidKey)?;
        Ok(Self::from_bytes(bytes))
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Standard base64 encoding of the key, for provisioning
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }
}

impl PartialEq for InvitationKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for InvitationKey {}

impl std::fmt::Debug for InvitationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InvitationKey([hidden])")
    }
}

/// Seal `plaintext` into an opaque token under `key`
///
/// A fresh random nonce is drawn for every call.
pub fn encrypt(plaintext: &str, key: &InvitationKey) -> Result<String, CodecError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = key
        .cipher()
        .encrypt_in_place_detached(Nonce::from_slice(&nonce_bytes), b"", &mut buffer)
        .map_err(|_| CodecError::Encryption)?;

    let mut token = Vec::with_capacity(HEADER_LEN + buffer.len());
    token.extend_from_slice(&nonce_bytes);
    token.extend_from_slice(tag.as_slice());
    token.extend_from_slice(&buffer);

    Ok(STANDARD.encode(token))
}

/// Open a token produced by [`encrypt`]
///
/// The tag is verified before any plaintext is released.
pub fn decrypt(token: &str, key: &InvitationKey) -> Result<String, CodecError> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|_| CodecError::MalformedToken)?;

    if bytes.len() < HEADER_LEN {
        return Err(CodecError::MalformedToken);
    }

    let (nonce, rest) = bytes.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let mut buffer = ciphertext.to_vec();
    key.cipher()
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| CodecError::Authentication)?;

    String::from_utf8(buffer).map_err(|_| CodecError::MalformedToken)
}
