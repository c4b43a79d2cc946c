//! Add-on webhook payloads.

use std::{collections::HashMap, fmt};

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coffer_app::provisioning::CreateResourceEvent;

/// Shown to the installer while the bucket is being created.
pub(crate) const ACCEPTED_MESSAGE: &str = "Your bucket is being provisioned and will be ready \
     shortly. Provisioning fails unless cloud credentials are registered for your team.";

/// One-time grant used to act on the installer's behalf.
#[derive(Clone, Deserialize, ToSchema)]
pub(crate) struct OAuthGrant {
    /// Authorization code
    pub code: String,

    /// Grant expiry
    #[serde(default)]
    pub expires_at: String,

    /// Grant type
    #[serde(default, rename = "type")]
    pub grant_type: String,
}

impl fmt::Debug for OAuthGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthGrant")
            .field("code", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("grant_type", &self.grant_type)
            .finish()
    }
}

/// Create Resource Request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub(crate) struct CreateResourceRequest {
    /// Add-on instance id
    pub uuid: String,

    /// Installer grant
    pub oauth_grant: OAuthGrant,

    /// Plan slug
    #[serde(default)]
    pub plan: String,

    /// Platform region
    #[serde(default)]
    pub region: String,

    /// Owning app id
    #[serde(default)]
    pub heroku_id: String,

    /// Where the platform expects asynchronous updates
    #[serde(default)]
    pub callback_url: String,

    /// Installer-supplied options
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl TryFrom<CreateResourceRequest> for CreateResourceEvent {
    type Error = uuid::Error;

    /// The add-on id ends up in platform API paths, so only canonical UUIDs pass.
    fn try_from(request: CreateResourceRequest) -> Result<Self, Self::Error> {
        let resource_id = Uuid::parse_str(&request.uuid)?;

        let mut event =
            CreateResourceEvent::new(resource_id.hyphenated().to_string(), request.oauth_grant.code);

        event.plan = request.plan;
        event.region = request.region;
        event.options = request.options.into_iter().collect();

        Ok(event)
    }
}

/// Resource Accepted Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ResourceAcceptedResponse {
    /// Id the platform uses for this resource from now on
    pub id: String,

    /// Message shown to the installer
    pub message: String,
}

/// Plan Change Request
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PlanChangeRequest {
    /// New plan slug
    #[serde(default)]
    pub plan: String,

    /// Owning app id
    #[serde(default)]
    pub heroku_id: String,
}

/// Config var in a plan change response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConfigVarResponse {
    pub name: String,
    pub value: String,
}

/// Plan Change Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlanChangeResponse {
    pub message: String,

    /// Config vars to replace; empty since buckets are plan independent
    pub config: Vec<ConfigVarResponse>,
}
