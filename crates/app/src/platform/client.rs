//! Platform HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response, header};

use crate::{
    crypto::SecretString,
    ids::{ResourceId, TenantId},
    platform::{
        PlatformError,
        models::{
            AddonInfo, AppInfo, Authorization, ConfigUpdate, ConfigVars, GrantRequest,
            ProvisioningOutcome,
        },
    },
};

/// Default identity service address.
pub const DEFAULT_ID_URL: &str = "https://id.heroku.com";

/// Default platform API address.
pub const DEFAULT_API_URL: &str = "https://api.heroku.com";

const ACCEPT: &str = "application/vnd.heroku+json; version=3";

/// Configuration for connecting to the platform.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Identity service address, e.g. `"https://id.heroku.com"`.
    pub id_url: String,

    /// API address, e.g. `"https://api.heroku.com"`.
    pub api_url: String,

    /// Add-on OAuth client secret.
    pub client_secret: SecretString,
}

impl PlatformConfig {
    pub fn new(client_secret: impl Into<SecretString>) -> Self {
        Self {
            id_url: DEFAULT_ID_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            client_secret: client_secret.into(),
        }
    }
}

#[automock]
#[async_trait]
/// Turns a one-time add-on grant into an API session.
pub trait PlatformAuthenticator: Send + Sync {
    /// Exchanges an OAuth grant code for a bearer session.
    async fn exchange_grant(&self, code: &str) -> Result<Arc<dyn PlatformApi>, PlatformError>;
}

#[automock]
#[async_trait]
/// Calls made with an authenticated platform session.
pub trait PlatformApi: Send + Sync {
    /// Resolves the tenant owning an add-on through its parent app.
    async fn resolve_owner(&self, resource: &ResourceId) -> Result<TenantId, PlatformError>;

    /// Replaces the add-on's config vars.
    async fn push_config(
        &self,
        resource: &ResourceId,
        config: ConfigVars,
    ) -> Result<(), PlatformError>;

    /// Reports the final provisioning state of an add-on.
    async fn report_outcome(
        &self,
        resource: &ResourceId,
        outcome: ProvisioningOutcome,
    ) -> Result<(), PlatformError>;
}

/// HTTP client for grant exchange.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    config: PlatformConfig,
    http: Client,
}

impl PlatformClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl PlatformAuthenticator for PlatformClient {
    async fn exchange_grant(&self, code: &str) -> Result<Arc<dyn PlatformApi>, PlatformError> {
        let url = format!("{}/oauth/token", self.config.id_url);

        let response = self
            .http
            .post(&url)
            .form(&GrantRequest {
                grant_type: "authorization_code",
                code,
                client_secret: self.config.client_secret.expose(),
            })
            .send()
            .await?;

        let response = expect_success(response, "grant exchange").await?;
        let authorization: Authorization = response.json().await?;

        Ok(Arc::new(PlatformSession {
            api_url: self.config.api_url.clone(),
            authorization: authorization.header_value(),
            http: self.http.clone(),
        }))
    }
}

/// Authenticated platform API session.
#[derive(Debug, Clone)]
pub struct PlatformSession {
    api_url: String,
    authorization: SecretString,
    http: Client,
}

impl PlatformSession {
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(header::ACCEPT, ACCEPT)
            .header(header::AUTHORIZATION, self.authorization.expose())
    }
}

#[async_trait]
impl PlatformApi for PlatformSession {
    async fn resolve_owner(&self, resource: &ResourceId) -> Result<TenantId, PlatformError> {
        let url = format!("{}/addons/{resource}", self.api_url);

        let response = self.authorized(self.http.get(&url)).send().await?;
        let addon: AddonInfo = expect_success(response, "addon lookup").await?.json().await?;

        let url = format!("{}/apps/{}", self.api_url, addon.app.id);

        let response = self.authorized(self.http.get(&url)).send().await?;
        let app: AppInfo = expect_success(response, "app lookup").await?.json().await?;

        Ok(TenantId::new(app.owner.id))
    }

    async fn push_config(
        &self,
        resource: &ResourceId,
        config: ConfigVars,
    ) -> Result<(), PlatformError> {
        let url = format!("{}/addons/{resource}/config", self.api_url);

        let response = self
            .authorized(self.http.patch(&url))
            .json(&ConfigUpdate { config: &config })
            .send()
            .await?;

        expect_success(response, "config update").await?;

        Ok(())
    }

    async fn report_outcome(
        &self,
        resource: &ResourceId,
        outcome: ProvisioningOutcome,
    ) -> Result<(), PlatformError> {
        let url = format!(
            "{}/addons/{resource}/actions/{}",
            self.api_url,
            outcome.action()
        );

        let response = self.authorized(self.http.post(&url)).send().await?;

        expect_success(response, outcome.action()).await?;

        Ok(())
    }
}

async fn expect_success(response: Response, request: &str) -> Result<Response, PlatformError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    Err(PlatformError::UnexpectedResponse(format!(
        "{request} request failed with status {status}: {text}"
    )))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use smallvec::smallvec;
    use testresult::TestResult;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, body_string_contains, header, method, path},
    };

    use crate::platform::ConfigVar;

    use super::*;

    const TOKEN: &str = "Bearer token-xyz";

    fn client(server: &MockServer) -> PlatformClient {
        PlatformClient::new(PlatformConfig {
            id_url: server.uri(),
            api_url: server.uri(),
            client_secret: "client-secret".into(),
        })
    }

    async fn mount_grant(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=code-abc"))
            .and(body_string_contains("client_secret=client-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "token-xyz",
                "refresh_token": "refresh-xyz",
                "expires_in": 28800,
                "token_type": "Bearer",
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn resolve_owner_follows_addon_to_app_owner() -> TestResult {
        let server = MockServer::start().await;

        mount_grant(&server).await;

        Mock::given(method("GET"))
            .and(path("/addons/add-123"))
            .and(header("authorization", TOKEN))
            .and(header("accept", ACCEPT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "app": { "id": "app-1", "name": "shop" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/apps/app-1"))
            .and(header("authorization", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "owner": { "id": "T1", "email": "owner@example.com" },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server).exchange_grant("code-abc").await?;
        let owner = session.resolve_owner(&ResourceId::from("add-123")).await?;

        assert_eq!(owner, TenantId::from("T1"));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_grant_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid grant"))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server).exchange_grant("expired").await;

        assert!(
            matches!(&result, Err(PlatformError::UnexpectedResponse(message)) if message.contains("401")),
            "expected an unexpected response error"
        );
    }

    #[tokio::test]
    async fn app_lookup_failure_fails_owner_resolution() -> TestResult {
        let server = MockServer::start().await;

        mount_grant(&server).await;

        Mock::given(method("GET"))
            .and(path("/addons/add-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "app": { "id": "gone" } })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/apps/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let session = client(&server).exchange_grant("code-abc").await?;
        let result = session.resolve_owner(&ResourceId::from("add-123")).await;

        assert!(result.is_err(), "expected owner resolution to fail");

        Ok(())
    }

    #[tokio::test]
    async fn push_config_patches_config_vars() -> TestResult {
        let server = MockServer::start().await;

        mount_grant(&server).await;

        Mock::given(method("PATCH"))
            .and(path("/addons/add-123/config"))
            .and(header("authorization", TOKEN))
            .and(body_json(json!({
                "config": [
                    { "name": "BUCKET_NAME", "value": "bucket-1" },
                    { "name": "AWS_ACCESS_KEY_ID", "value": "AKIA" },
                ],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server).exchange_grant("code-abc").await?;

        session
            .push_config(
                &ResourceId::from("add-123"),
                smallvec![
                    ConfigVar::new("BUCKET_NAME", "bucket-1"),
                    ConfigVar::new("AWS_ACCESS_KEY_ID", "AKIA"),
                ],
            )
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn report_outcome_posts_the_matching_action() -> TestResult {
        let server = MockServer::start().await;

        mount_grant(&server).await;

        Mock::given(method("POST"))
            .and(path("/addons/add-123/actions/provision"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/addons/add-456/actions/deprovision"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server).exchange_grant("code-abc").await?;

        session
            .report_outcome(&ResourceId::from("add-123"), ProvisioningOutcome::Provisioned)
            .await?;
        session
            .report_outcome(&ResourceId::from("add-456"), ProvisioningOutcome::Failed)
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn report_outcome_surfaces_rejections() -> TestResult {
        let server = MockServer::start().await;

        mount_grant(&server).await;

        Mock::given(method("POST"))
            .and(path("/addons/add-123/actions/provision"))
            .respond_with(ResponseTemplate::new(422).set_body_string("already provisioned"))
            .mount(&server)
            .await;

        let session = client(&server).exchange_grant("code-abc").await?;
        let result = session
            .report_outcome(&ResourceId::from("add-123"), ProvisioningOutcome::Provisioned)
            .await;

        assert!(
            matches!(&result, Err(PlatformError::UnexpectedResponse(message)) if message.contains("already provisioned")),
            "expected the rejection body in the error"
        );

        Ok(())
    }

    #[test]
    fn authorization_debug_redacts_tokens() -> TestResult {
        let authorization: Authorization = serde_json::from_value(json!({
            "access_token": "token-xyz",
            "refresh_token": "refresh-xyz",
            "token_type": "Bearer",
        }))?;

        let debug = format!("{authorization:?}");

        assert!(!debug.contains("token-xyz"));
        assert!(!debug.contains("refresh-xyz"));

        Ok(())
    }
}
