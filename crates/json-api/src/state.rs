//! State

use std::sync::Arc;

use coffer_app::{context::AppContext, provisioning::WorkQueue};

use crate::addons::auth::AddonCredentials;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) queue: WorkQueue,
    pub(crate) credentials: AddonCredentials,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, queue: WorkQueue, credentials: AddonCredentials) -> Self {
        Self {
            app,
            queue,
            credentials,
        }
    }

    #[must_use]
    pub(crate) fn shared(
        app: AppContext,
        queue: WorkQueue,
        credentials: AddonCredentials,
    ) -> Arc<Self> {
        Arc::new(Self::new(app, queue, credentials))
    }
}
