//! Resources Data

use crate::ids::{ProviderResourceId, ResourceId, TenantId};

/// New Resource Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub provider_resource_id: ProviderResourceId,
    pub tenant_id: TenantId,
    pub resource_id: ResourceId,
    pub access_key_id: String,
}
