//! Test helpers.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use salvo::{affix_state::inject, prelude::*};

use coffer_app::{
    context::AppContext,
    domain::{accounts::MockAccountsService, resources::MockResourcesService},
    provisioning::WorkQueue,
};

use crate::{addons::auth::AddonCredentials, state::State};

pub(crate) const TEST_MANIFEST_ID: &str = "coffer";
pub(crate) const TEST_PASSWORD: &str = "addon-password";

pub(crate) fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

fn strict_accounts_mock() -> MockAccountsService {
    let mut accounts = MockAccountsService::new();

    accounts.expect_save_account().never();
    accounts.expect_find_account().never();
    accounts.expect_find_accounts().never();
    accounts.expect_delete_account().never();

    accounts
}

pub(crate) fn strict_resources_mock() -> MockResourcesService {
    let mut resources = MockResourcesService::new();

    resources.expect_save_resource().never();
    resources.expect_find_resource_and_owner().never();
    resources.expect_mark_for_deletion().never();
    resources.expect_set_deleted().never();
    resources.expect_list_pending_deletions().never();

    resources
}

pub(crate) fn state_with(resources: MockResourcesService, queue: WorkQueue) -> Arc<State> {
    let app = AppContext {
        accounts: Arc::new(strict_accounts_mock()),
        resources: Arc::new(resources),
    };

    State::shared(
        app,
        queue,
        AddonCredentials::new(TEST_MANIFEST_ID, TEST_PASSWORD),
    )
}

/// State whose stores and queue must never be touched.
pub(crate) fn strict_state() -> Arc<State> {
    let (queue, _receiver) = WorkQueue::channel(1);

    state_with(strict_resources_mock(), queue)
}

pub(crate) fn addons_service(
    resources: MockResourcesService,
    queue: WorkQueue,
    route: Router,
) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with(resources, queue)))
            .push(route),
    )
}
