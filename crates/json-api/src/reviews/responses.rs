//! Review Responses

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{
    orders::records::Page,
    reviews::records::{ReviewEligibility, ReviewRecord},
};

/// Review Eligibility Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct EligibilityResponse {
    /// Whether the caller may review the product
    pub allowed: bool,

    /// One of `eligible`, `not_purchased` or `already_reviewed`
    pub reason: String,

    /// Customer facing explanation
    pub message: String,
}

impl From<ReviewEligibility> for EligibilityResponse {
    fn from(eligibility: ReviewEligibility) -> Self {
        Self {
            allowed: eligibility.allowed,
            reason: eligibility.reason.as_str().to_string(),
            message: eligibility.reason.message().to_string(),
        }
    }
}

/// Review Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReviewResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub user_uuid: Uuid,
    pub rating: u8,
    pub comment: Option<String>,

    /// Moderation status; new reviews are `pending`
    pub status: String,

    pub created_at: String,
}

impl From<ReviewRecord> for ReviewResponse {
    fn from(review: ReviewRecord) -> Self {
        Self {
            uuid: review.uuid.into(),
            product_uuid: review.product_uuid.into(),
            user_uuid: review.user_uuid.into(),
            rating: review.rating,
            comment: review.comment,
            status: review.status.to_string(),
            created_at: review.created_at.to_string(),
        }
    }
}

/// Review Page Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReviewPageResponse {
    pub data: Vec<ReviewResponse>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl From<Page<ReviewRecord>> for ReviewPageResponse {
    fn from(page: Page<ReviewRecord>) -> Self {
        Self {
            data: page.data.into_iter().map(Into::into).collect(),
            total: page.total,
            per_page: page.per_page,
            current_page: page.current_page,
            last_page: page.last_page,
        }
    }
}
