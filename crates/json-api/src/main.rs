//! Coffer add-on webhook server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use coffer_app::{
    cloud::{BucketController, aws::AwsConnector},
    context::AppContext,
    platform::PlatformClient,
    provisioning::{WorkQueue, WorkerPool},
};

use crate::{
    addons::auth::AddonCredentials,
    config::ServerConfig,
    observability::{MetricsJobObserver, Observability},
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod addons;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Builds the webhook router around shared state.
fn router(state: Arc<State>) -> Router {
    Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(remove_slash())
        .hoop(inject(state))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("heroku/resources")
                .hoop(addons::auth::handler)
                .post(addons::create::handler)
                .push(
                    Router::with_path("{id}")
                        .put(addons::update::handler)
                        .delete(addons::delete::handler),
                ),
        )
}

/// Coffer webhook server entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let addr = config.socket_addr();

    let app = match AppContext::from_database_url(
        &config.database.database_url,
        config.secrets.secret_keys.clone(),
        config.database.migrate,
    )
    .await
    {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let provisioner = app.provisioner(
        Arc::new(PlatformClient::new(config.platform.client_config())),
        Arc::new(BucketController::new(Arc::new(AwsConnector::new(
            config.cloud.aws_region.clone(),
        )))),
    );

    let (queue, receiver) = WorkQueue::channel(config.queue.queue_capacity);

    let pool = WorkerPool::spawn(
        config.queue.workers,
        receiver,
        Arc::new(provisioner),
        Arc::new(MetricsJobObserver),
    );

    info!(
        workers = config.queue.workers,
        capacity = config.queue.queue_capacity,
        region = %config.cloud.aws_region,
        "provisioning workers started"
    );

    let state = State::shared(app, queue, AddonCredentials::from(&config.addon));
    let router = router(state);

    let doc = OpenApi::new("Coffer Add-on API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "addon_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let server = Server::new(listener);

    let handle = server.handle();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests; the router owns the last queue handle
    server.serve(router).await;

    info!("server stopped; draining queued jobs");

    pool.join().await;

    observability.shutdown();
}

#[cfg(test)]
mod tests {
    use coffer_app::{ids::ProviderResourceId, provisioning::Job};
    use salvo::{
        http::header::AUTHORIZATION,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{
        TEST_MANIFEST_ID, TEST_PASSWORD, basic_auth, state_with, strict_resources_mock,
        strict_state,
    };

    use super::*;

    #[tokio::test]
    async fn test_webhooks_require_basic_auth() {
        let service = Service::new(router(strict_state()));

        let res = TestClient::post("http://example.com/heroku/resources")
            .json(&json!({ "uuid": "01234567-89ab-cdef-0123-456789abcdef", "oauth_grant": { "code": "c" } }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        let res = TestClient::delete(format!(
            "http://example.com/heroku/resources/{}",
            ProviderResourceId::generate()
        ))
        .send(&service)
        .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_healthcheck_is_public() -> TestResult {
        let service = Service::new(router(strict_state()));

        let mut res = TestClient::get("http://example.com/healthcheck")
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(res.take_string().await?.contains("\"ok\""));

        Ok(())
    }

    #[tokio::test]
    async fn test_authorized_plan_change_reaches_handler() {
        let service = Service::new(router(strict_state()));

        let res = TestClient::put("http://example.com/heroku/resources/abc")
            .add_header(AUTHORIZATION, basic_auth(TEST_MANIFEST_ID, TEST_PASSWORD), true)
            .json(&json!({ "plan": "premium" }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_authorized_create_is_queued() {
        let (queue, mut receiver) = WorkQueue::channel(2);
        let state = state_with(strict_resources_mock(), queue);

        let res = TestClient::post("http://example.com/heroku/resources")
            .add_header(AUTHORIZATION, basic_auth(TEST_MANIFEST_ID, TEST_PASSWORD), true)
            .json(&json!({ "uuid": "01234567-89ab-cdef-0123-456789abcdef", "oauth_grant": { "code": "c" } }))
            .send(&Service::new(router(state)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::ACCEPTED));
        assert!(
            matches!(receiver.recv().await, Some(Job::Create { .. })),
            "expected a queued create job"
        );
    }
}
