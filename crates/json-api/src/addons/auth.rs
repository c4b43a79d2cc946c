//! Basic auth gate for platform webhooks.

use std::{fmt, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use salvo::{
    http::header::{AUTHORIZATION, WWW_AUTHENTICATE},
    prelude::*,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use coffer_app::crypto::SecretString;

use crate::{config::addon::AddonAuthConfig, state::State};

const CHALLENGE: &str = "Basic realm=\"coffer\"";

/// Manifest id and password the platform signs webhooks with.
#[derive(Clone)]
pub(crate) struct AddonCredentials {
    user: String,
    password: SecretString,
}

impl AddonCredentials {
    pub(crate) fn new(user: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    fn accepts(&self, user: &str, password: &str) -> bool {
        let user_matches = self.user.as_bytes().ct_eq(user.as_bytes());
        let password_matches = self.password.expose().as_bytes().ct_eq(password.as_bytes());

        (user_matches & password_matches).into()
    }
}

impl From<&AddonAuthConfig> for AddonCredentials {
    fn from(config: &AddonAuthConfig) -> Self {
        Self::new(&config.addon_manifest_id, config.addon_password.as_str())
    }
}

impl fmt::Debug for AddonCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddonCredentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Ok(state) = depot.obtain::<Arc<State>>() else {
        res.render(StatusError::internal_server_error());
        ctrl.skip_rest();

        return;
    };

    let authorized = extract_basic_credentials(req)
        .is_some_and(|(user, password)| state.credentials.accepts(&user, &password));

    if !authorized {
        if let Err(error) = res.add_header(WWW_AUTHENTICATE, CHALLENGE, true) {
            warn!("failed to set authentication challenge: {error}");
        }

        res.render(StatusError::unauthorized().brief("Invalid add-on credentials"));
        ctrl.skip_rest();

        return;
    }

    ctrl.call_next(req, depot, res).await;
}

fn extract_basic_credentials(req: &Request) -> Option<(String, String)> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;

    Some((user.to_owned(), password.to_owned()))
}
