pub mod adapters;
pub mod aggregator;
pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod pricing;
pub mod providers;
pub mod services;

use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub aggregator: Arc<Aggregator>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
