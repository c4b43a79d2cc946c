//! Platform models.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::crypto::SecretString;

/// Config var holding the bucket name.
pub const BUCKET_NAME_VAR: &str = "BUCKET_NAME";

/// Config var holding the scoped access key id.
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";

/// Config var holding the scoped secret access key.
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Bearer credentials returned by a grant exchange.
#[derive(Clone, Deserialize)]
pub struct Authorization {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub token_type: String,
}

impl Authorization {
    pub(crate) fn header_value(&self) -> SecretString {
        SecretString::new(format!("{} {}", self.token_type, self.access_token))
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorization")
            .field("access_token", &"**redacted**")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "**redacted**"))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// One add-on config var.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ConfigVar {
    pub name: String,
    pub value: String,
}

impl ConfigVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Debug for ConfigVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigVar")
            .field("name", &self.name)
            .field("value", &"**redacted**")
            .finish()
    }
}

/// Config vars pushed to one add-on. Provisioning always sends three.
pub type ConfigVars = SmallVec<[ConfigVar; 3]>;

/// Final provisioning state reported back to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    Provisioned,
    Failed,
}

impl ProvisioningOutcome {
    /// Add-on action path segment for this outcome.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Provisioned => "provision",
            Self::Failed => "deprovision",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GrantRequest<'a> {
    pub(crate) grant_type: &'static str,
    pub(crate) code: &'a str,
    pub(crate) client_secret: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConfigUpdate<'a> {
    pub(crate) config: &'a [ConfigVar],
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddonInfo {
    pub(crate) app: Reference,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppInfo {
    pub(crate) owner: Reference,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Reference {
    pub(crate) id: String,
}
