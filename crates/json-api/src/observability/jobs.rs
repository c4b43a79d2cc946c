//! Job outcome metering.

use coffer_app::provisioning::{JobObserver, JobReport};

use super::metrics;

/// Feeds every finished provisioning job into the Prometheus registry.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MetricsJobObserver;

impl JobObserver for MetricsJobObserver {
    fn job_finished(&self, report: &JobReport) {
        metrics::observe_job(
            report.kind.as_str(),
            report.outcome.as_str(),
            report.elapsed.as_secs_f64(),
        );
    }
}
