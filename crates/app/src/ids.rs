//! Typed Identifiers

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// Number of random bytes behind a provider resource id.
pub const PROVIDER_RESOURCE_ID_BYTES: usize = 16;

const PROVIDER_RESOURCE_ID_HEX_CHARS: usize = PROVIDER_RESOURCE_ID_BYTES * 2;

/// String identifier tagged with the kind of thing it identifies.
pub struct TypedId<T>(String, PhantomData<T>);

impl<T> TypedId<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into(), PhantomData)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<T> Clone for TypedId<T> {
    fn clone(&self) -> Self {
        Self::new(self.0.clone())
    }
}

impl<T> Debug for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedId<T> {}

impl<T> Hash for TypedId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> From<String> for TypedId<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> From<&str> for TypedId<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> From<TypedId<T>> for String {
    fn from(value: TypedId<T>) -> Self {
        value.into_string()
    }
}

/// Marker for platform tenants (add-on owners).
#[derive(Debug)]
pub struct Tenant;

/// Marker for platform add-on instances.
#[derive(Debug)]
pub struct Addon;

/// Platform-issued tenant identifier.
pub type TenantId = TypedId<Tenant>;

/// Platform-issued add-on instance identifier.
pub type ResourceId = TypedId<Addon>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("provider resource id must be {PROVIDER_RESOURCE_ID_HEX_CHARS} lowercase hex characters")]
pub struct InvalidProviderResourceId;

/// Internally generated identifier that seeds cloud resource names.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderResourceId(String);

impl ProviderResourceId {
    /// Draw a fresh identifier from the operating system CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; PROVIDER_RESOURCE_ID_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self(hex::encode(bytes))
    }

    /// Accept an identifier previously produced by [`ProviderResourceId::generate`].
    ///
    /// # Errors
    ///
    /// Returns an error unless `value` is exactly 32 lowercase hex characters.
    pub fn parse(value: &str) -> Result<Self, InvalidProviderResourceId> {
        let well_formed = value.len() == PROVIDER_RESOURCE_ID_HEX_CHARS
            && value
                .bytes()
                .all(|byte| matches!(byte, b'0'..=b'9' | b'a'..=b'f'));

        if !well_formed {
            return Err(InvalidProviderResourceId);
        }

        Ok(Self(value.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the bucket owned by this resource.
    #[must_use]
    pub fn bucket_name(&self) -> String {
        format!("bucket-{}", self.0)
    }

    /// Name of the scoped identity owned by this resource.
    #[must_use]
    pub fn user_name(&self) -> String {
        format!("user-{}", self.0)
    }
}

impl Debug for ProviderResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl Display for ProviderResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}
