//! Cipher keys.

use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroize;

use super::CipherError;

/// Number of bytes in a cipher key.
pub const CIPHER_KEY_BYTES: usize = 32;

/// Symmetric key used to seal and open secret tokens.
#[derive(Clone)]
pub struct CipherKey {
    bytes: [u8; CIPHER_KEY_BYTES],
}

impl CipherKey {
    /// Generate a new key from the operating system CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; CIPHER_KEY_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self::from_bytes(bytes)
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; CIPHER_KEY_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub(crate) const fn as_bytes(&self) -> &[u8; CIPHER_KEY_BYTES] {
        &self.bytes
    }

    /// Text form of the key, suitable for configuration.
    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE.encode(self.bytes)
    }
}

impl FromStr for CipherKey {
    type Err = CipherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut decoded = URL_SAFE
            .decode(value.trim())
            .map_err(|_ignored| CipherError::InvalidKey)?;

        let bytes = <[u8; CIPHER_KEY_BYTES]>::try_from(decoded.as_slice())
            .map_err(|_ignored| CipherError::InvalidKey);

        decoded.zeroize();

        bytes.map(Self::from_bytes)
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(**redacted**)")?;
        Ok(())
    }
}

impl Drop for CipherKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
