//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_http_request, record_invitation_failure,
    record_invitation_issued, record_invitation_redeemed, PrometheusMetrics, UNMATCHED_PATH,
};
