//! Add-on Errors

use salvo::http::StatusError;
use tracing::error;

use coffer_app::provisioning::QueueError;

pub(crate) fn into_status_error(error: QueueError) -> StatusError {
    match error {
        QueueError::Full => {
            StatusError::service_unavailable().brief("Too many pending requests, retry later")
        }
        QueueError::Closed => {
            error!("work queue closed; rejecting webhook");

            StatusError::service_unavailable().brief("Shutting down, retry later")
        }
    }
}
