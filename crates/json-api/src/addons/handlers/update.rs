//! Plan Change Handler

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;

use crate::addons::models::{PlanChangeRequest, PlanChangeResponse};

/// Plan Change Handler
///
/// Buckets are identical on every plan, so nothing changes.
#[endpoint(
    tags("heroku"),
    summary = "Change add-on plan",
    security(("addon_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Plan changed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid add-on credentials"),
    ),
)]
pub(crate) async fn handler(
    id: PathParam<String>,
    json: JsonBody<PlanChangeRequest>,
) -> Json<PlanChangeResponse> {
    let id = id.into_inner();
    let request = json.into_inner();

    info!(provider_resource_id = %id, plan = %request.plan, "add-on plan changed");

    Json(PlanChangeResponse {
        message: format!("plan changed to {} for {id}", request.plan),
        config: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use coffer_app::provisioning::WorkQueue;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{addons_service, strict_resources_mock};

    use super::*;

    #[tokio::test]
    async fn test_plan_change_returns_empty_config() -> TestResult {
        let (queue, _receiver) = WorkQueue::channel(1);

        let service = addons_service(
            strict_resources_mock(),
            queue,
            Router::with_path("heroku/resources/{id}").put(handler),
        );

        let mut res = TestClient::put("http://example.com/heroku/resources/abc123")
            .json(&json!({ "plan": "premium", "heroku_id": "app123@heroku.com" }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: PlanChangeResponse = res.take_json().await?;

        assert_eq!(body.message, "plan changed to premium for abc123");
        assert!(body.config.is_empty(), "expected no config changes");

        Ok(())
    }
}
