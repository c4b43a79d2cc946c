//! HTTP span helpers.

use coffer_app::ids::ProviderResourceId;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Replaces per-resource path segments so routes keep a bounded label set.
fn normalise_path_for_span_name(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        if ProviderResourceId::parse(segment).is_ok() {
            normalised.push_str("{id}");
        } else if Uuid::parse_str(segment).is_ok() {
            normalised.push_str("{uuid}");
        } else {
            normalised.push_str(segment);
        }
    }

    normalised
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_resource_ids_are_collapsed() {
        let id = ProviderResourceId::generate();

        let names = request_span_name("DELETE", &format!("/heroku/resources/{id}"));

        assert_eq!(names.otel_path, "/heroku/resources/{id}");
        assert_eq!(names.otel_span_name, "DELETE /heroku/resources/{id}");
    }

    #[test]
    fn uuid_segments_are_collapsed() {
        let names = request_span_name("GET", "/things/01890a5d-ac96-774b-bcce-b302099a8057");

        assert_eq!(names.otel_path, "/things/{uuid}");
    }

    #[test]
    fn static_paths_are_kept() {
        assert_eq!(request_span_name("GET", "/").otel_path, "/");
        assert_eq!(
            request_span_name("POST", "/heroku/resources").otel_path,
            "/heroku/resources"
        );
    }
}
