//! Account Records

use jiff::Timestamp;

use crate::{cloud::CloudCredentials, ids::TenantId};

/// Account Record
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub tenant_id: TenantId,
    pub credentials: CloudCredentials,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
