//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    jobs_total: IntCounterVec,
    job_duration_seconds: HistogramVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        if let Some(metrics) = metrics() {
            metrics.requests_in_flight.inc();
            return Self { tracked: true };
        }

        Self { tracked: false }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_class = status_class(status_code);
    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

pub(super) fn observe_job(kind: &str, outcome: &str, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    metrics.jobs_total.with_label_values(&[kind, outcome]).inc();

    metrics
        .job_duration_seconds
        .with_label_values(&[kind])
        .observe(duration_seconds);
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metric_families, &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    let content_type = match HeaderValue::from_str(encoder.format_type()) {
        Ok(value) => value,
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    };

    res.headers_mut().insert(CONTENT_TYPE, content_type);
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static Metrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

fn build_metrics() -> Option<Metrics> {
    let registry = Registry::new();

    let requests_total = match IntCounterVec::new(
        Opts::new(
            "coffer_json_http_requests_total",
            "Total HTTP requests partitioned by method, route, status class, and status code.",
        ),
        &["method", "route", "status_class", "status_code"],
    ) {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create requests_total metric: {source}");
            return None;
        }
    };

    let request_duration_seconds = match HistogramVec::new(
        HistogramOpts::new(
            "coffer_json_http_request_duration_seconds",
            "HTTP request duration in seconds partitioned by method and route.",
        )
        .buckets(vec![
            0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "route"],
    ) {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create request_duration metric: {source}");
            return None;
        }
    };

    let requests_in_flight = match IntGauge::with_opts(Opts::new(
        "coffer_json_http_requests_in_flight",
        "Current number of in-flight HTTP requests.",
    )) {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create in-flight gauge metric: {source}");
            return None;
        }
    };

    let jobs_total = match IntCounterVec::new(
        Opts::new(
            "coffer_jobs_total",
            "Finished provisioning jobs partitioned by kind and outcome.",
        ),
        &["kind", "outcome"],
    ) {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create jobs_total metric: {source}");
            return None;
        }
    };

    // Policy attach alone may sleep for up to eighteen seconds.
    let job_duration_seconds = match HistogramVec::new(
        HistogramOpts::new(
            "coffer_job_duration_seconds",
            "Provisioning job duration in seconds partitioned by kind.",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["kind"],
    ) {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create job_duration metric: {source}");
            return None;
        }
    };

    let collectors: [(&str, Box<dyn Collector>); 5] = [
        ("requests_total", Box::new(requests_total.clone())),
        ("request_duration", Box::new(request_duration_seconds.clone())),
        ("in-flight gauge", Box::new(requests_in_flight.clone())),
        ("jobs_total", Box::new(jobs_total.clone())),
        ("job_duration", Box::new(job_duration_seconds.clone())),
    ];

    for (name, collector) in collectors {
        if let Err(source) = registry.register(collector) {
            error!("failed to register {name} metric: {source}");
            return None;
        }
    }

    Some(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        jobs_total,
        job_duration_seconds,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };

    use super::*;

    #[tokio::test]
    async fn metrics_endpoint_exposes_http_and_job_metrics() {
        observe_request("POST", "/heroku/resources", 202, 0.042);
        observe_request("DELETE", "/heroku/resources/{id}", 500, 0.123);
        observe_job("create", "succeeded", 12.5);

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let response = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await
            .unwrap_or_default();

        for name in [
            "coffer_json_http_requests_total",
            "coffer_json_http_request_duration_seconds",
            "coffer_json_http_requests_in_flight",
            "coffer_jobs_total{kind=\"create\",outcome=\"succeeded\"}",
            "coffer_job_duration_seconds_bucket{kind=\"create\"",
        ] {
            assert!(response.contains(name), "expected {name} in response");
        }
    }

    #[test]
    fn status_class_groups_codes() {
        assert_eq!(status_class(202), "2xx");
        assert_eq!(status_class(401), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(42), "other");
    }
}
