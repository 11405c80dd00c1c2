//! Secure token codec.
//!
//! # Responsibilities
//! - Encrypt query strings into opaque `tk` tokens and back
//! - Split decoded tokens into key/value parameters
//! - Build secure URLs in path or query style
//!
//! # Design Decisions
//! - AES-256 in ECB mode with PKCS#7 padding; the secret is zero-padded or
//!   truncated to 32 bytes, matching OpenSSL's handling of short keys
//! - Base64 with the URL-safe alphabet (`+` → `-`, `/` → `_`), padding kept
//!   on encode and optional on decode
//! - No authentication tag: tokens are obscured, not tamper-proof.
//!   Existing token consumers depend on this exact format.

use std::collections::BTreeMap;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use thiserror::Error;

const BLOCK_SIZE: usize = 16;
const KEY_SIZE: usize = 32;

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors raised while decoding a token.
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Ciphertext length {0} is not a positive multiple of the block size")]
    CiphertextLength(usize),

    #[error("Invalid padding in decrypted token")]
    Padding,

    #[error("Decrypted token is not valid UTF-8")]
    Utf8,
}

/// Routing style used when building secure URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStyle {
    /// `<base>/tk/<token>`
    Path,
    /// `<base>/?tk=<token>`
    Query,
}

/// Symmetric codec for `tk` tokens.
#[derive(Clone)]
pub struct SecurityCodec {
    cipher: Aes256,
}

impl std::fmt::Debug for SecurityCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityCodec").finish_non_exhaustive()
    }
}

impl SecurityCodec {
    /// Create a codec from the shared secret.
    pub fn new(secret: &str) -> Self {
        let key = derive_key(secret.as_bytes());
        Self {
            cipher: Aes256::new(GenericArray::from_slice(&key)),
        }
    }

    /// Encrypt and encode a query string.
    pub fn encode(&self, plaintext: &str) -> String {
        TOKEN_ENGINE.encode(self.encrypt(plaintext.as_bytes()))
    }

    /// Decode and decrypt a token.
    pub fn decode(&self, token: &str) -> Result<String, SecurityError> {
        let ciphertext = TOKEN_ENGINE.decode(token.trim())?;
        let plaintext = self.decrypt(ciphertext)?;
        String::from_utf8(plaintext).map_err(|_| SecurityError::Utf8)
    }

    /// Decode a token and split it into parameters.
    ///
    /// Pairs are separated by `&` and split on the first `=`; a pair without
    /// `=` maps to an empty value and empty pairs are skipped.
    pub fn decode_query_params(&self, token: &str) -> Result<BTreeMap<String, String>, SecurityError> {
        let query = self.decode(token)?;
        Ok(split_query(&query))
    }

    /// Build a secure URL for `params` under `base_url`.
    pub fn build_secure_url(&self, base_url: &str, style: UrlStyle, params: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let token = self.encode(params);
        match style {
            UrlStyle::Path => format!("{base}/tk/{token}"),
            UrlStyle::Query => format!("{base}/?tk={token}"),
        }
    }

    fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let pad = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;
        let mut buf = Vec::with_capacity(plaintext.len() + pad);
        buf.extend_from_slice(plaintext);
        buf.resize(plaintext.len() + pad, pad as u8);

        for block in buf.chunks_exact_mut(BLOCK_SIZE) {
            self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
        buf
    }

    fn decrypt(&self, mut buf: Vec<u8>) -> Result<Vec<u8>, SecurityError> {
        if buf.is_empty() || buf.len() % BLOCK_SIZE != 0 {
            return Err(SecurityError::CiphertextLength(buf.len()));
        }

        for block in buf.chunks_exact_mut(BLOCK_SIZE) {
            self.cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }

        let pad = buf.last().copied().map(usize::from).unwrap_or(0);
        if pad == 0 || pad > BLOCK_SIZE || buf[buf.len() - pad..].iter().any(|&b| usize::from(b) != pad) {
            return Err(SecurityError::Padding);
        }
        buf.truncate(buf.len() - pad);
        Ok(buf)
    }
}

fn derive_key(secret: &[u8]) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    let len = secret.len().min(KEY_SIZE);
    key[..len].copy_from_slice(&secret[..len]);
    key
}

fn split_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}
