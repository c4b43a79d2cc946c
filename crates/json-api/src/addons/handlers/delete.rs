//! Delete Resource Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;

use coffer_app::{ids::ProviderResourceId, provisioning::Job};

use crate::{addons::errors::into_status_error, extensions::*, state::State};

/// Delete Resource Handler
///
/// Marks the resource for deletion before queueing teardown, so a repeated
/// webhook is harmless.
#[endpoint(
    tags("heroku"),
    summary = "Deprovision add-on",
    security(("addon_auth" = [])),
    responses(
        (status_code = StatusCode::ACCEPTED, description = "Teardown queued"),
        (status_code = StatusCode::NOT_FOUND, description = "Unknown resource id"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid add-on credentials"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Work queue unavailable"),
    ),
)]
pub(crate) async fn handler(
    id: PathParam<String>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let provider_resource_id =
        ProviderResourceId::parse(&id.into_inner()).or_404("Unknown resource id")?;

    info!(provider_resource_id = %provider_resource_id, "add-on deprovisioning requested");

    state
        .app
        .resources
        .mark_for_deletion(&provider_resource_id)
        .await
        .or_500("failed to mark resource for deletion")?;

    state
        .queue
        .submit(Job::Delete {
            provider_resource_id,
        })
        .map_err(into_status_error)?;

    Ok(StatusCode::ACCEPTED)
}
