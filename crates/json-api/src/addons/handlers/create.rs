//! Create Resource Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::info;

use coffer_app::{
    ids::ProviderResourceId,
    provisioning::{CreateResourceEvent, Job},
};

use crate::{
    addons::{
        errors::into_status_error,
        models::{ACCEPTED_MESSAGE, CreateResourceRequest, ResourceAcceptedResponse},
    },
    extensions::*,
    state::State,
};

/// Create Resource Handler
///
/// Queues bucket provisioning and answers before any of it runs.
#[endpoint(
    tags("heroku"),
    summary = "Provision add-on",
    security(("addon_auth" = [])),
    responses(
        (status_code = StatusCode::ACCEPTED, description = "Provisioning queued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid add-on credentials"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Work queue unavailable"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateResourceRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ResourceAcceptedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let event = CreateResourceEvent::try_from(json.into_inner())
        .map_err(|_| StatusError::bad_request().brief("uuid must be an add-on UUID"))?;

    let provider_resource_id = ProviderResourceId::generate();

    info!(
        resource_id = %event.resource_id,
        provider_resource_id = %provider_resource_id,
        plan = %event.plan,
        region = %event.region,
        "add-on provisioning requested"
    );

    state
        .queue
        .submit(Job::Create {
            event,
            provider_resource_id: provider_resource_id.clone(),
        })
        .map_err(into_status_error)?;

    res.status_code(StatusCode::ACCEPTED);

    Ok(Json(ResourceAcceptedResponse {
        id: provider_resource_id.to_string(),
        message: ACCEPTED_MESSAGE.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use coffer_app::provisioning::WorkQueue;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{addons_service, strict_resources_mock};

    use super::*;

    fn make_service(queue: WorkQueue) -> Service {
        addons_service(
            strict_resources_mock(),
            queue,
            Router::with_path("heroku/resources").post(handler),
        )
    }

    fn create_payload() -> serde_json::Value {
        json!({
            "uuid": "01234567-89ab-cdef-0123-456789abcdef",
            "heroku_id": "app123@heroku.com",
            "plan": "basic",
            "region": "amazon-web-services::us-east-1",
            "callback_url": "https://api.heroku.com/addons/01234567-89ab-cdef-0123-456789abcdef",
            "oauth_grant": {
                "code": "grant-code",
                "expires_at": "2026-10-19T12:00:00Z",
                "type": "authorization_code",
            },
            "options": { "versioning": "on" },
        })
    }

    #[tokio::test]
    async fn test_create_queues_job_and_returns_202() -> TestResult {
        let (queue, mut receiver) = WorkQueue::channel(4);

        let mut res = TestClient::post("http://example.com/heroku/resources")
            .json(&create_payload())
            .send(&make_service(queue))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::ACCEPTED));

        let body: ResourceAcceptedResponse = res.take_json().await?;

        assert_eq!(body.message, ACCEPTED_MESSAGE);

        let Some(Job::Create {
            event,
            provider_resource_id,
        }) = receiver.recv().await
        else {
            return Err("expected a queued create job".into());
        };

        assert_eq!(provider_resource_id, ProviderResourceId::parse(&body.id)?);
        assert_eq!(event.resource_id.as_str(), "01234567-89ab-cdef-0123-456789abcdef");
        assert_eq!(event.oauth_grant_code.expose(), "grant-code");
        assert_eq!(event.plan, "basic");
        assert_eq!(event.region, "amazon-web-services::us-east-1");
        assert_eq!(event.options.get("versioning").map(String::as_str), Some("on"));

        Ok(())
    }

    #[tokio::test]
    async fn test_each_create_gets_a_fresh_id() -> TestResult {
        let (queue, _receiver) = WorkQueue::channel(4);
        let service = make_service(queue);

        let mut first = TestClient::post("http://example.com/heroku/resources")
            .json(&create_payload())
            .send(&service)
            .await;

        let mut second = TestClient::post("http://example.com/heroku/resources")
            .json(&create_payload())
            .send(&service)
            .await;

        let first: ResourceAcceptedResponse = first.take_json().await?;
        let second: ResourceAcceptedResponse = second.take_json().await?;

        assert_ne!(first.id, second.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_without_grant_returns_400() {
        let (queue, _receiver) = WorkQueue::channel(4);

        let res = TestClient::post("http://example.com/heroku/resources")
            .json(&json!({ "uuid": "01234567-89ab-cdef-0123-456789abcdef", "plan": "basic" }))
            .send(&make_service(queue))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_create_with_path_like_uuid_returns_400() {
        let (queue, mut receiver) = WorkQueue::channel(4);

        let mut payload = create_payload();
        payload["uuid"] = json!("../apps/other");

        let res = TestClient::post("http://example.com/heroku/resources")
            .json(&payload)
            .send(&make_service(queue))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert!(receiver.try_recv().is_none(), "nothing should be queued");
    }

    #[tokio::test]
    async fn test_create_normalizes_uuid() -> TestResult {
        let (queue, mut receiver) = WorkQueue::channel(4);

        let mut payload = create_payload();
        payload["uuid"] = json!("{01234567-89AB-CDEF-0123-456789ABCDEF}");

        let res = TestClient::post("http://example.com/heroku/resources")
            .json(&payload)
            .send(&make_service(queue))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::ACCEPTED));

        let Some(Job::Create { event, .. }) = receiver.recv().await else {
            return Err("expected a queued create job".into());
        };

        assert_eq!(event.resource_id.as_str(), "01234567-89ab-cdef-0123-456789abcdef");

        Ok(())
    }

    #[tokio::test]
    async fn test_full_queue_returns_503() -> TestResult {
        let (queue, _receiver) = WorkQueue::channel(1);

        queue.submit(Job::Delete {
            provider_resource_id: ProviderResourceId::generate(),
        })?;

        let res = TestClient::post("http://example.com/heroku/resources")
            .json(&create_payload())
            .send(&make_service(queue))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));

        Ok(())
    }

    #[tokio::test]
    async fn test_stopped_workers_return_503() {
        let (queue, receiver) = WorkQueue::channel(4);

        drop(receiver);

        let res = TestClient::post("http://example.com/heroku/resources")
            .json(&create_payload())
            .send(&make_service(queue))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SERVICE_UNAVAILABLE));
    }
}
