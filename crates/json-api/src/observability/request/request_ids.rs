//! Request ID resolution and response header helpers.

use salvo::{
    http::{StatusCode, header::HeaderValue},
    prelude::Response,
};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied request id that is echoed back.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse the caller's request id when it is short printable ASCII, otherwise
/// mint a fresh one.
pub(super) fn resolve_request_id(header_value: Option<String>) -> String {
    header_value
        .map(|value| value.trim().to_owned())
        .filter(|value| {
            !value.is_empty()
                && value.len() <= MAX_REQUEST_ID_LEN
                && value.bytes().all(|byte| byte.is_ascii_graphic())
        })
        .unwrap_or_else(generate_request_id)
}

pub(super) fn set_request_id_header(res: &mut Response, request_id: &str) {
    let header_value = match HeaderValue::from_str(request_id) {
        Ok(value) => value,
        Err(source) => {
            warn!(
                request_id,
                "could not encode request id for response header: {source}"
            );

            return;
        }
    };

    res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
}

pub(super) fn response_status_or_ok(status_code: Option<StatusCode>) -> StatusCode {
    status_code.unwrap_or(StatusCode::OK)
}

fn generate_request_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_request_id_is_kept() {
        assert_eq!(
            resolve_request_id(Some(" heroku-req-1 ".to_string())),
            "heroku-req-1"
        );
    }

    #[test]
    fn blank_oversized_or_binary_ids_are_replaced() {
        for rejected in [
            None,
            Some("   ".to_string()),
            Some("x".repeat(MAX_REQUEST_ID_LEN + 1)),
            Some("line\nbreak".to_string()),
        ] {
            let resolved = resolve_request_id(rejected.clone());

            assert!(
                Uuid::parse_str(&resolved).is_ok(),
                "expected a generated id for {rejected:?}, got {resolved}"
            );
        }
    }
}
