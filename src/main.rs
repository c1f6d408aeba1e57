use std::sync::Arc;
use std::time::Duration;

use chainfolio::api::router::create_router;
use chainfolio::aggregator::Aggregator;
use chainfolio::config::AppConfig;
use chainfolio::metrics::init_metrics;
use chainfolio::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = init_metrics();

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let aggregator = Aggregator::from_config(&config, http);
    tracing::info!(
        families = ?aggregator.enabled_families(),
        "Aggregator initialized"
    );

    let state = AppState {
        config,
        aggregator: Arc::new(aggregator),
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
