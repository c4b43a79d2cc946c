//! Secret-at-rest encryption.
//!
//! Secrets are sealed into versioned, timestamped tokens. A [`KeyRing`] seals
//! with its primary key and opens with any key it holds, so keys can be rotated
//! by prepending a new one while old tokens stay readable.

mod errors;
mod key;
mod ring;
mod secret;

pub use errors::CipherError;
pub use key::{CIPHER_KEY_BYTES, CipherKey};
pub use ring::KeyRing;
pub use secret::SecretString;
