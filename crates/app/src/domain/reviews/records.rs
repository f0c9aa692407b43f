//! Review Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::Serialize;
use thiserror::Error;

use crate::{
    domain::{identity::UserUuid, products::records::ProductUuid},
    uuids::TypedUuid,
};

/// Review UUID
pub type ReviewUuid = TypedUuid<ReviewRecord>;

/// Review Record
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRecord {
    pub uuid: ReviewUuid,
    pub product_uuid: ProductUuid,
    pub user_uuid: UserUuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Moderation state of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Moderation is a single decision: a pending review is approved or rejected, once.
    #[must_use]
    pub const fn can_moderate_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Pending, Self::Approved | Self::Rejected))
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown review status: {0}")]
pub struct UnknownReviewStatus(String);

impl FromStr for ReviewStatus {
    type Err = UnknownReviewStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownReviewStatus(other.to_string())),
        }
    }
}

/// Why a user may or may not review a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityReason {
    Eligible,
    NotPurchased,
    AlreadyReviewed,
}

impl EligibilityReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eligible => "eligible",
            Self::NotPurchased => "not_purchased",
            Self::AlreadyReviewed => "already_reviewed",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Eligible => "You can review this product",
            Self::NotPurchased => "You must purchase this product before reviewing it",
            Self::AlreadyReviewed => "You have already reviewed this product",
        }
    }
}

impl fmt::Display for EligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Review gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewEligibility {
    pub allowed: bool,
    pub reason: EligibilityReason,
}

impl ReviewEligibility {
    pub(crate) fn decide(purchased: bool, reviewed: bool) -> Self {
        let reason = if !purchased {
            EligibilityReason::NotPurchased
        } else if reviewed {
            EligibilityReason::AlreadyReviewed
        } else {
            EligibilityReason::Eligible
        };

        Self {
            allowed: reason == EligibilityReason::Eligible,
            reason,
        }
    }
}
