//! Accounts Data

use crate::{crypto::SecretString, ids::TenantId};

/// New Account Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub tenant_id: TenantId,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}
