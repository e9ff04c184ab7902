//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::ClaimId;
use domain_claims::QueueSummary;

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Submits a claim for assessment and routing
pub async fn submit_claim(
    State(state): State<AppState>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    request.validate()?;

    let submission = request.into_submission(state.engine.config().currency);
    let history = state
        .engine
        .claimant_history(submission.client_id, submission.prior_claims)
        .await?;
    let claim = state.engine.submit_claim(submission, history).await?;

    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Lists claims matching the query string filters
pub async fn list_claims(
    State(state): State<AppState>,
    Query(params): Query<ClaimFilterParams>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = state.engine.list_claims(&params.into_query()).await?;
    Ok(Json(claims.into_iter().map(ClaimResponse::from).collect()))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.engine.get_claim(ClaimId::from_uuid(id)).await?;
    Ok(Json(claim.into()))
}

/// Applies an approve, deny or escalate decision
pub async fn decide_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;

    let role = request.role()?;
    let decision = request.decision(state.engine.config().currency);
    let claim = state
        .engine
        .decide_claim(ClaimId::from_uuid(id), decision, role, &request.reason)
        .await?;

    Ok(Json(claim.into()))
}

/// Counts claims per status
pub async fn queue_summary(
    State(state): State<AppState>,
) -> Result<Json<QueueSummary>, ApiError> {
    Ok(Json(state.engine.queue_summary().await?))
}
