//! Cipher errors.

use thiserror::Error;

/// Secret encryption error variants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// A key ring was built without any keys.
    #[error("key ring must hold at least one key")]
    NoKeys,

    /// Key text was not 32 bytes of url-safe base64.
    #[error("cipher key must be 32 url-safe base64 encoded bytes")]
    InvalidKey,

    /// Sealing the plaintext failed.
    #[error("failed to encrypt secret")]
    Seal,

    /// Token text could not be decoded into a token.
    #[error("secret token is malformed")]
    Malformed,

    /// Token was produced by an unknown format version.
    #[error("secret token uses an unsupported version")]
    UnsupportedVersion,

    /// No configured key authenticates the token.
    #[error("secret token could not be authenticated with any configured key")]
    Undecryptable,

    /// Token is older than the permitted age, or stamped in the future.
    #[error("secret token has expired")]
    Expired,
}
