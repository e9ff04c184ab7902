//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_claims::{Claim, ClaimStatus, ReserveSnapshot};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts the status/tier/reserve invariants of a claim
pub fn assert_claim_consistent(claim: &Claim) {
    if let Some(tier) = claim.status.tier() {
        assert_eq!(
            tier, claim.tier,
            "Claim {} is {} but at tier {}",
            claim.id, claim.status, claim.tier
        );
    }
    assert!(
        claim.is_consistent(),
        "Claim {} is inconsistent: status={}, approved={}, reserve={}",
        claim.id,
        claim.status,
        claim.amount_approved,
        claim.reserve_amount
    );
}

/// Asserts that a claim did not change
pub fn assert_claim_unchanged(before: &Claim, after: &Claim) {
    assert_eq!(before.status, after.status, "Status changed for claim {}", before.id);
    assert_eq!(before.tier, after.tier, "Tier changed for claim {}", before.id);
    assert_eq!(
        before.approval_history.len(),
        after.approval_history.len(),
        "Approval history changed for claim {}",
        before.id
    );
    assert_eq!(before, after, "Claim {} changed", before.id);
}

/// Asserts that a claim reached `status` with its audit trail recording it
pub fn assert_decided(claim: &Claim, status: ClaimStatus) {
    assert_eq!(claim.status, status, "Claim {} has status {}", claim.id, claim.status);
    assert!(
        !claim.approval_history.is_empty(),
        "Claim {} reached {} with an empty approval history",
        claim.id,
        status
    );
}

/// Asserts that status and risk band partitions both sum to the snapshot total
pub fn assert_snapshot_partitions(snapshot: &ReserveSnapshot) {
    let by_status: Decimal = snapshot.by_status.values().map(Money::amount).sum();
    let by_band: Decimal = snapshot.by_risk_band.values().map(Money::amount).sum();
    let by_policy: Decimal = snapshot.by_policy.values().map(Money::amount).sum();

    assert_eq!(by_status, snapshot.total.amount(), "Status partitions do not sum to total");
    assert_eq!(by_band, snapshot.total.amount(), "Risk band partitions do not sum to total");
    assert_eq!(by_policy, snapshot.total.amount(), "Policy partitions do not sum to total");
}
