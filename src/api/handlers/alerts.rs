use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::{Wallet, WhaleAlert};
use crate::services::alert_filter;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertRequest {
    /// All tracked whale wallets to scan.
    pub wallets: Vec<Wallet>,
    /// Significance threshold; falls back to the configured default.
    #[serde(default)]
    pub min_value_usd: Option<Decimal>,
}

/// Scan tracked whale wallets for transactions above the significance
/// threshold and return them as unread alerts.
pub async fn significant(
    State(state): State<AppState>,
    Json(request): Json<AlertRequest>,
) -> Result<Json<ApiResponse<Vec<WhaleAlert>>>, AppError> {
    let threshold = request
        .min_value_usd
        .unwrap_or(state.config.alert_min_value_usd);

    let alerts =
        alert_filter::significant_transfers(&state.aggregator, &request.wallets, threshold).await;
    Ok(Json(ApiResponse::ok(alerts)))
}
