//! Reserve DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use core_kernel::ClaimId;
use domain_claims::AdjustmentType;

use super::claims::validate_non_negative;

#[derive(Debug, Deserialize, Validate)]
pub struct AdjustmentRequest {
    pub claim_id: Uuid,
    pub adjustment_type: AdjustmentType,
    #[validate(custom(function = "validate_non_negative"))]
    pub amount: Decimal,
    #[validate(length(max = 2000))]
    pub reason: String,
    #[validate(length(min = 1, max = 128))]
    pub adjusted_by: String,
}

impl AdjustmentRequest {
    pub fn claim_id(&self) -> ClaimId {
        ClaimId::from_uuid(self.claim_id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AdjustmentListParams {
    pub claim_id: Option<Uuid>,
}

impl AdjustmentListParams {
    pub fn claim_id(&self) -> Option<ClaimId> {
        self.claim_id.map(ClaimId::from_uuid)
    }
}
