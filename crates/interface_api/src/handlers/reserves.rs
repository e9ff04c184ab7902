//! Reserve handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use core_kernel::Money;
use domain_claims::{ReserveAdjustment, ReserveAdjustmentStats, ReserveSnapshot};
use validator::Validate;

use crate::dto::claims::ClaimFilterParams;
use crate::dto::reserves::*;
use crate::{error::ApiError, AppState};

/// Aggregates reserves over the claims matching the filters
pub async fn reserve_snapshot(
    State(state): State<AppState>,
    Query(params): Query<ClaimFilterParams>,
) -> Result<Json<ReserveSnapshot>, ApiError> {
    let snapshot = state.engine.reserve_snapshot(Some(params.into_query())).await?;
    Ok(Json(snapshot))
}

/// Records a manual reserve adjustment
pub async fn record_adjustment(
    State(state): State<AppState>,
    Json(request): Json<AdjustmentRequest>,
) -> Result<(StatusCode, Json<ReserveAdjustment>), ApiError> {
    request.validate()?;

    let amount = Money::new(request.amount, state.engine.config().currency);
    let adjustment = state
        .engine
        .adjust_reserve(
            request.claim_id(),
            request.adjustment_type,
            amount,
            &request.reason,
            &request.adjusted_by,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(adjustment)))
}

/// Lists the adjustment ledger, optionally for one claim
pub async fn list_adjustments(
    State(state): State<AppState>,
    Query(params): Query<AdjustmentListParams>,
) -> Result<Json<Vec<ReserveAdjustment>>, ApiError> {
    Ok(Json(state.engine.reserve_adjustments(params.claim_id()).await?))
}

pub async fn adjustment_statistics(
    State(state): State<AppState>,
) -> Result<Json<ReserveAdjustmentStats>, ApiError> {
    Ok(Json(state.engine.adjustment_statistics().await?))
}
