//! Resource Records

use jiff::Timestamp;

use crate::{
    domain::accounts::records::AccountRecord,
    ids::{ProviderResourceId, ResourceId, TenantId},
};

/// Resource Record
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub provider_resource_id: ProviderResourceId,
    pub tenant_id: TenantId,
    pub resource_id: ResourceId,

    /// Access key minted for the scoped identity; needed to delete that exact key.
    pub access_key_id: String,
    pub marked_for_deletion: bool,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Resource together with its owner's unsealed account.
#[derive(Debug, Clone)]
pub struct OwnedResourceRecord {
    pub resource: ResourceRecord,
    pub owner: AccountRecord,
}
