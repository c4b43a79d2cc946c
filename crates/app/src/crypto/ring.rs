//! Key ring and token format.
//!
//! Token layout (before url-safe base64 without padding):
//!
//! ```text
//! version (1) | issued_at unix seconds, big endian (8) | nonce (24) | ciphertext + tag
//! ```
//!
//! The version and timestamp are bound to the ciphertext as associated data.

use std::{iter, str::FromStr, time::Duration};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead as _, KeyInit as _, Payload},
};
use jiff::Timestamp;
use rand::{RngCore, rngs::OsRng};

use super::{CipherError, CipherKey};

const TOKEN_VERSION: u8 = 0x81;
const HEADER_LEN: usize = 9;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

/// Tokens stamped further than this into the future are rejected when a TTL applies.
const MAX_CLOCK_SKEW_SECS: u64 = 60;

/// Ordered set of keys: the primary seals, every key may open.
#[derive(Debug, Clone)]
pub struct KeyRing {
    primary: CipherKey,
    previous: Vec<CipherKey>,
}

impl KeyRing {
    /// Build a ring whose first key is the primary.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::NoKeys`] when `keys` is empty.
    pub fn new(keys: Vec<CipherKey>) -> Result<Self, CipherError> {
        let mut keys = keys.into_iter();
        let primary = keys.next().ok_or(CipherError::NoKeys)?;

        Ok(Self {
            primary,
            previous: keys.collect(),
        })
    }

    #[must_use]
    pub fn single(key: CipherKey) -> Self {
        Self {
            primary: key,
            previous: Vec::new(),
        }
    }

    /// Seal `plaintext` with the primary key, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher fails to seal.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        self.encrypt_at(plaintext, now_unix_seconds())
    }

    /// Open a token with any key in the ring, regardless of its age.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed or no key authenticates it.
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CipherError> {
        self.decrypt_at(token, None, now_unix_seconds())
    }

    /// Open a token, rejecting it when it was issued more than `ttl` ago.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Expired`] for stale tokens, otherwise as [`KeyRing::decrypt`].
    pub fn decrypt_with_ttl(&self, token: &str, ttl: Duration) -> Result<Vec<u8>, CipherError> {
        self.decrypt_at(token, Some(ttl), now_unix_seconds())
    }

    fn keys(&self) -> impl Iterator<Item = &CipherKey> {
        iter::once(&self.primary).chain(&self.previous)
    }

    fn encrypt_at(&self, plaintext: &[u8], issued_at: u64) -> Result<String, CipherError> {
        let header = encode_header(issued_at);

        let mut nonce = [0_u8; NONCE_LEN];

        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher(&self.primary)
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &header,
                },
            )
            .map_err(|_ignored| CipherError::Seal)?;

        let mut token = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());

        token.extend_from_slice(&header);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    fn decrypt_at(
        &self,
        token: &str,
        ttl: Option<Duration>,
        now: u64,
    ) -> Result<Vec<u8>, CipherError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_ignored| CipherError::Malformed)?;

        if raw.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
            return Err(CipherError::Malformed);
        }

        let (header, rest) = raw.split_at(HEADER_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let issued_at = decode_header(header)?;

        let plaintext = self
            .keys()
            .find_map(|key| {
                cipher(key)
                    .decrypt(
                        XNonce::from_slice(nonce),
                        Payload {
                            msg: ciphertext,
                            aad: header,
                        },
                    )
                    .ok()
            })
            .ok_or(CipherError::Undecryptable)?;

        if let Some(ttl) = ttl {
            let too_old = now.saturating_sub(issued_at) > ttl.as_secs();
            let from_future = issued_at > now.saturating_add(MAX_CLOCK_SKEW_SECS);

            if too_old || from_future {
                return Err(CipherError::Expired);
            }
        }

        Ok(plaintext)
    }
}

impl FromStr for KeyRing {
    type Err = CipherError;

    /// Parse a comma separated key list, primary first.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let keys = value
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(CipherKey::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(keys)
    }
}

fn cipher(key: &CipherKey) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))
}

fn encode_header(issued_at: u64) -> [u8; HEADER_LEN] {
    let mut header = [0_u8; HEADER_LEN];
    let (version, timestamp) = header.split_at_mut(1);

    version.copy_from_slice(&[TOKEN_VERSION]);
    timestamp.copy_from_slice(&issued_at.to_be_bytes());

    header
}

fn decode_header(header: &[u8]) -> Result<u64, CipherError> {
    let (version, timestamp) = header.split_first().ok_or(CipherError::Malformed)?;

    if *version != TOKEN_VERSION {
        return Err(CipherError::UnsupportedVersion);
    }

    let timestamp = <[u8; 8]>::try_from(timestamp).map_err(|_ignored| CipherError::Malformed)?;

    Ok(u64::from_be_bytes(timestamp))
}

fn now_unix_seconds() -> u64 {
    u64::try_from(Timestamp::now().as_second()).unwrap_or_default()
}
