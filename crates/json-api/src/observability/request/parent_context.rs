//! Parent trace context extraction from HTTP headers.

use opentelemetry::{Context, global, propagation::Extractor, trace::TraceContextExt as _};
use salvo::http::{HeaderMap, HeaderName};

/// Extracts a valid remote parent from `traceparent` style headers.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    let extractor = HeaderExtractor { headers };

    global::get_text_map_propagator(|propagator| {
        // Start from an empty context so requests without trace headers are roots.
        let context = propagator.extract_with_context(&Context::new(), &extractor);

        context
            .span()
            .span_context()
            .is_valid()
            .then_some(context)
    })
}

#[derive(Debug)]
struct HeaderExtractor<'a> {
    headers: &'a HeaderMap,
}

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key)?.to_str().ok()
    }

    fn keys(&self) -> Vec<&str> {
        self.headers.keys().map(HeaderName::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use salvo::http::HeaderValue;

    use super::*;

    #[test]
    fn traceparent_header_becomes_the_parent() {
        global::set_text_map_propagator(TraceContextPropagator::new());

        let mut headers = HeaderMap::new();

        headers.insert(
            "traceparent",
            HeaderValue::from_static("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        );

        let context = extract_parent_context(&headers);

        assert!(context.is_some(), "expected a remote parent context");

        assert!(
            extract_parent_context(&HeaderMap::new()).is_none(),
            "expected no parent without trace headers"
        );
    }
}
