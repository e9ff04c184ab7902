//! HTTP API tests
//!
//! Drive the router in-process with `tower::ServiceExt::oneshot` against an
//! in-memory claim repository, or against a repository whose backing store is
//! unreachable.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, ClaimId, ClientId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_claims::{
    Claim, ClaimQuery, ClaimRepository, ClaimsEngine, EngineConfig, InMemoryClaimRepository,
    ReserveAdjustment,
};
use interface_api::create_router;
use test_utils::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_app() -> (Router, Arc<ClaimsEngine>) {
    let repository = Arc::new(InMemoryClaimRepository::new());
    let engine = Arc::new(ClaimsEngine::new(repository, EngineConfig::default()));
    (create_router(engine.clone()), engine)
}

/// Repository whose backing store cannot be reached
struct UnreachableRepository;

impl UnreachableRepository {
    fn error() -> PortError {
        PortError::connection("claims store unreachable")
    }
}

impl DomainPort for UnreachableRepository {}

#[async_trait]
impl HealthCheckable for UnreachableRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "unreachable-claims".to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms: 5000,
            message: Some("claims store unreachable".to_string()),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ClaimRepository for UnreachableRepository {
    async fn get(&self, _id: ClaimId) -> Result<Claim, PortError> {
        Err(Self::error())
    }

    async fn list(&self, _query: &ClaimQuery) -> Result<Vec<Claim>, PortError> {
        Err(Self::error())
    }

    async fn insert(&self, _claim: Claim) -> Result<Claim, PortError> {
        Err(Self::error())
    }

    async fn update(&self, _claim: Claim, _expected_version: u64) -> Result<Claim, PortError> {
        Err(Self::error())
    }

    async fn count_by_client(&self, _client_id: ClientId) -> Result<u32, PortError> {
        Err(Self::error())
    }

    async fn append_adjustment(
        &self,
        _adjustment: ReserveAdjustment,
    ) -> Result<ReserveAdjustment, PortError> {
        Err(Self::error())
    }

    async fn list_adjustments(
        &self,
        _claim_id: Option<ClaimId>,
    ) -> Result<Vec<ReserveAdjustment>, PortError> {
        Err(Self::error())
    }
}

fn unreachable_app() -> Router {
    let engine = ClaimsEngine::new(Arc::new(UnreachableRepository), EngineConfig::default());
    create_router(Arc::new(engine))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

/// A documented weekday claim against a mature policy; scores zero
fn small_claim_body() -> Value {
    json!({
        "policy_id": Uuid::new_v4(),
        "client_id": Uuid::new_v4(),
        "incident_date": "2024-07-10",
        "description": StringFixtures::detailed_description(),
        "amount_requested": "2450.75",
        "photo_count": 3,
        "prior_claims": 0,
        "policy_start_date": "2019-05-01",
        "submitted_at": "2024-07-17T10:00:00Z"
    })
}

async fn submit(app: &Router, body: Value) -> Value {
    let (status, claim) = send(app, Method::POST, "/api/v1/claims", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected response: {}", claim);
    claim
}

fn decision(action: &str, role: &str, reason: &str) -> Value {
    json!({ "action": action, "role": role, "reason": reason })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_repository() {
    let (app, _) = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["repository"]["adapter_id"], "in-memory-claims");
}

#[tokio::test]
async fn test_health_unavailable_when_repository_unhealthy() {
    let app = unreachable_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["repository"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_storage_failures_are_internal_errors() {
    let app = unreachable_app();

    let (status, error) = send(&app, Method::GET, "/api/v1/claims", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["error"], "internal_error");
    assert_eq!(error["message"], "storage failure");

    let (status, _) = send(&app, Method::POST, "/api/v1/claims", Some(small_claim_body())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let uri = format!("/api/v1/claims/{}", Uuid::new_v4());
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_submit_small_claim_routes_to_l1() {
    let (app, _) = test_app();

    let claim = submit(&app, small_claim_body()).await;

    assert_eq!(claim["status"], "Pending L1");
    assert_eq!(claim["tier"], "L1");
    assert_eq!(claim["fraud_score"], 0);
    assert_eq!(claim["risk_band"], "low");
    assert_eq!(decimal(&claim["reserve_amount"]), dec!(2450.75));
    assert_eq!(claim["approval_history"], json!([]));
}

#[tokio::test]
async fn test_submit_large_claim_routes_to_l3() {
    let (app, _) = test_app();
    let mut body = small_claim_body();
    body["amount_requested"] = json!("75000.00");

    let claim = submit(&app, body).await;

    assert_eq!(claim["status"], "Pending L3");
    assert_eq!(claim["tier"], "L3");
}

#[tokio::test]
async fn test_submit_negative_amount_is_rejected() {
    let (app, _) = test_app();
    let mut body = small_claim_body();
    body["amount_requested"] = json!("-50.00");

    let (status, error) = send(&app, Method::POST, "/api/v1/claims", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "validation_error");
    assert!(error["details"][0].as_str().unwrap().starts_with("amount_requested"));
}

#[tokio::test]
async fn test_submit_amount_above_ceiling_is_rejected() {
    let (app, engine) = test_app();
    let mut body = small_claim_body();
    body["amount_requested"] = json!("39614081257132168796771975167");

    let (status, error) = send(&app, Method::POST, "/api/v1/claims", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "validation_error");
    assert!(error["details"][0].as_str().unwrap().starts_with("amount_requested"));
    assert_eq!(engine.queue_summary().await.unwrap().total, 0);
}

#[tokio::test]
async fn test_submit_nil_policy_is_rejected() {
    let (app, engine) = test_app();
    let mut body = small_claim_body();
    body["policy_id"] = json!(Uuid::nil());

    let (status, error) = send(&app, Method::POST, "/api/v1/claims", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "validation_error");
    assert_eq!(engine.queue_summary().await.unwrap().total, 0);
}

#[tokio::test]
async fn test_submit_foreign_currency_is_rejected() {
    let (app, _) = test_app();
    let mut body = small_claim_body();
    body["currency"] = json!("EUR");

    let (status, _) = send(&app, Method::POST, "/api/v1/claims", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Retrieval
// ============================================================================

#[tokio::test]
async fn test_get_claim() {
    let (app, _) = test_app();
    let claim = submit(&app, small_claim_body()).await;
    let id = claim["id"].as_str().unwrap();

    let (status, fetched) = send(&app, Method::GET, &format!("/api/v1/claims/{}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], claim["id"]);
    assert_eq!(fetched["version"], claim["version"]);
}

#[tokio::test]
async fn test_get_unknown_claim_is_not_found() {
    let (app, _) = test_app();

    let (status, error) = send(
        &app,
        Method::GET,
        &format!("/api/v1/claims/{}", Uuid::new_v4()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn test_list_claims_with_filters() {
    let (app, _) = test_app();
    submit(&app, small_claim_body()).await;
    let mut large = small_claim_body();
    large["amount_requested"] = json!("75000.00");
    submit(&app, large).await;

    let (status, all) = send(&app, Method::GET, "/api/v1/claims", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, l3) = send(&app, Method::GET, "/api/v1/claims?tier=L3", None).await;
    let l3 = l3.as_array().unwrap();
    assert_eq!(l3.len(), 1);
    assert_eq!(l3[0]["tier"], "L3");

    let (_, page) = send(&app, Method::GET, "/api/v1/claims?limit=1", None).await;
    assert_eq!(page.as_array().unwrap().len(), 1);
}

// ============================================================================
// Decisions
// ============================================================================

#[tokio::test]
async fn test_escalate_then_approve_with_amount() {
    let (app, _) = test_app();
    let claim = submit(&app, small_claim_body()).await;
    let uri = format!("/api/v1/claims/{}/decision", claim["id"].as_str().unwrap());

    let (status, escalated) = send(
        &app,
        Method::POST,
        &uri,
        Some(decision("escalate", "L1_APPROVER", "Needs senior review")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(escalated["status"], "Pending L2");
    assert_eq!(escalated["tier"], "L2");

    let mut approve = decision("approve", "L2_APPROVER", "Repair estimate verified");
    approve["approved_amount"] = json!("2000.00");
    let (status, approved) = send(&app, Method::POST, &uri, Some(approve)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "Approved");
    assert_eq!(decimal(&approved["amount_approved"]), dec!(2000.00));
    assert_eq!(decimal(&approved["reserve_amount"]), dec!(450.75));
    assert_eq!(approved["approval_history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_under_authorized_decision_is_forbidden() {
    let (app, engine) = test_app();
    let mut body = small_claim_body();
    body["amount_requested"] = json!("75000.00");
    let claim = submit(&app, body).await;
    let id = claim["id"].as_str().unwrap();

    let (status, error) = send(
        &app,
        Method::POST,
        &format!("/api/v1/claims/{}/decision", id),
        Some(decision("approve", "L1_APPROVER", "Looks fine")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["error"], "forbidden");

    let stored = engine
        .get_claim(core_kernel::ClaimId::from_uuid(Uuid::parse_str(id).unwrap()))
        .await
        .unwrap();
    assert_eq!(stored.version, claim["version"].as_u64().unwrap());
    assert!(stored.approval_history.is_empty());
}

#[tokio::test]
async fn test_blank_reason_is_rejected() {
    let (app, _) = test_app();
    let claim = submit(&app, small_claim_body()).await;

    let (status, error) = send(
        &app,
        Method::POST,
        &format!("/api/v1/claims/{}/decision", claim["id"].as_str().unwrap()),
        Some(decision("deny", "L1_APPROVER", "   ")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "missing_reason");
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    let (app, _) = test_app();
    let claim = submit(&app, small_claim_body()).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/claims/{}/decision", claim["id"].as_str().unwrap()),
        Some(decision("deny", "SUPERVISOR", "Fraudulent")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_decision_on_terminal_claim_conflicts() {
    let (app, _) = test_app();
    let claim = submit(&app, small_claim_body()).await;
    let uri = format!("/api/v1/claims/{}/decision", claim["id"].as_str().unwrap());

    let (status, denied) = send(
        &app,
        Method::POST,
        &uri,
        Some(decision("deny", "L1_APPROVER", "Policy exclusion applies")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(denied["status"], "Denied");
    assert_eq!(decimal(&denied["reserve_amount"]), Decimal::ZERO);

    let (status, error) = send(
        &app,
        Method::POST,
        &uri,
        Some(decision("approve", "L3_APPROVER", "Overturned")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "conflict");
}

// ============================================================================
// Queue and Reserves
// ============================================================================

#[tokio::test]
async fn test_queue_summary() {
    let (app, _) = test_app();
    submit(&app, small_claim_body()).await;
    submit(&app, small_claim_body()).await;
    let mut large = small_claim_body();
    large["amount_requested"] = json!("75000.00");
    submit(&app, large).await;

    let (status, queue) = send(&app, Method::GET, "/api/v1/claims/queue", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue["total"], 3);
    assert_eq!(queue["pending"], 3);
    assert_eq!(queue["by_status"]["Pending L1"], 2);
    assert_eq!(queue["by_status"]["Pending L3"], 1);
    assert_eq!(queue["by_status"]["Approved"], 0);
}

#[tokio::test]
async fn test_reserve_snapshot_totals() {
    let (app, _) = test_app();
    submit(&app, small_claim_body()).await;
    submit(&app, small_claim_body()).await;

    let (status, snapshot) = send(&app, Method::GET, "/api/v1/reserves/snapshot", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["claim_count"], 2);
    assert_eq!(decimal(&snapshot["total"]["amount"]), dec!(4901.50));
    assert_eq!(decimal(&snapshot["by_risk_band"]["low"]["amount"]), dec!(4901.50));

    let (_, filtered) = send(&app, Method::GET, "/api/v1/reserves/snapshot?tier=L3", None).await;
    assert_eq!(filtered["claim_count"], 0);
}

#[tokio::test]
async fn test_reserve_adjustment_ledger() {
    let (app, _) = test_app();
    let claim = submit(&app, small_claim_body()).await;
    let claim_id = claim["id"].clone();

    let (status, adjustment) = send(
        &app,
        Method::POST,
        "/api/v1/reserves/adjustments",
        Some(json!({
            "claim_id": claim_id,
            "adjustment_type": "increase",
            "amount": "500.00",
            "reason": "Supplementary repair invoice",
            "adjusted_by": StringFixtures::adjuster()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&adjustment["previous_reserve"]["amount"]), dec!(2450.75));
    assert_eq!(decimal(&adjustment["new_reserve"]["amount"]), dec!(2950.75));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/reserves/adjustments",
        Some(json!({
            "claim_id": claim_id,
            "adjustment_type": "decrease",
            "amount": "100.00",
            "reason": "",
            "adjusted_by": StringFixtures::adjuster()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, ledger) = send(
        &app,
        Method::GET,
        &format!("/api/v1/reserves/adjustments?claim_id={}", claim_id.as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(ledger.as_array().unwrap().len(), 1);

    let (status, stats) =
        send(&app, Method::GET, "/api/v1/reserves/adjustments/statistics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_adjustments"], 1);
    assert_eq!(stats["increases"], 1);
    assert_eq!(decimal(&stats["net_adjustment"]["amount"]), dec!(500.00));
}

#[tokio::test]
async fn test_adjustment_for_unknown_claim_is_not_found() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/reserves/adjustments",
        Some(json!({
            "claim_id": Uuid::new_v4(),
            "adjustment_type": "increase",
            "amount": "10.00",
            "reason": "Late invoice",
            "adjusted_by": StringFixtures::adjuster()
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
