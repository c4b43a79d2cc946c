//! Workflow inputs.

use rustc_hash::FxHashMap;

use crate::{crypto::SecretString, ids::ResourceId};

/// Parsed add-on create webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateResourceEvent {
    pub resource_id: ResourceId,

    /// One-time OAuth grant exchanged for a platform session.
    pub oauth_grant_code: SecretString,
    pub plan: String,
    pub region: String,
    pub options: FxHashMap<String, String>,
}

impl CreateResourceEvent {
    pub fn new(resource_id: impl Into<ResourceId>, oauth_grant_code: impl Into<SecretString>) -> Self {
        Self {
            resource_id: resource_id.into(),
            oauth_grant_code: oauth_grant_code.into(),
            plan: String::new(),
            region: String::new(),
            options: FxHashMap::default(),
        }
    }
}
