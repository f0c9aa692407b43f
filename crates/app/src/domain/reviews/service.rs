//! Reviews service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        identity::{Caller, UserUuid},
        orders::{data::PageRequest, records::Page},
        products::records::ProductUuid,
        reviews::{
            data::NewReview,
            errors::ReviewsServiceError,
            records::{ReviewEligibility, ReviewRecord, ReviewStatus, ReviewUuid},
            repository::PgReviewsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgReviewsService {
    db: Db,
    repository: PgReviewsRepository,
}

impl PgReviewsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReviewsRepository::new(),
        }
    }

    async fn list_in_status(
        &self,
        product: Option<ProductUuid>,
        status: ReviewStatus,
        page: PageRequest,
    ) -> Result<Page<ReviewRecord>, ReviewsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let total = self
            .repository
            .count_reviews(&mut tx, product, status)
            .await?;
        let reviews = self
            .repository
            .list_reviews(&mut tx, product, status, page)
            .await?;

        tx.commit().await?;

        Ok(Page::new(reviews, total, page.per_page, page.page))
    }
}

#[async_trait]
impl ReviewsService for PgReviewsService {
    async fn can_review(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<ReviewEligibility, ReviewsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let purchased = self
            .repository
            .has_delivered_purchase(&mut tx, user, product)
            .await?;

        let reviewed = self.repository.has_reviewed(&mut tx, user, product).await?;

        tx.commit().await?;

        Ok(ReviewEligibility::decide(purchased, reviewed))
    }

    #[tracing::instrument(
        name = "reviews.service.create_review",
        skip(self, review),
        fields(user_uuid = %user, product_uuid = %product, rating = review.rating),
        err
    )]
    async fn create_review(
        &self,
        user: UserUuid,
        product: ProductUuid,
        review: NewReview,
    ) -> Result<ReviewRecord, ReviewsServiceError> {
        if !(1..=5).contains(&review.rating) {
            return Err(ReviewsServiceError::InvalidRating(review.rating));
        }

        let eligibility = self.can_review(user, product).await?;

        if !eligibility.allowed {
            return Err(ReviewsServiceError::NotEligible(eligibility.reason));
        }

        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .repository
            .insert_review(&mut tx, user, product, &review)
            .await?;

        tx.commit().await?;

        info!(review_uuid = %created.uuid, "created review");

        Ok(created)
    }

    #[tracing::instrument(
        name = "reviews.service.update_status",
        skip(self, caller),
        fields(user_uuid = %caller.user, review_uuid = %review, status = %status),
        err
    )]
    async fn update_status(
        &self,
        caller: Caller,
        review: ReviewUuid,
        status: ReviewStatus,
    ) -> Result<ReviewRecord, ReviewsServiceError> {
        if !caller.is_admin() {
            return Err(ReviewsServiceError::PermissionDenied);
        }

        let mut tx = self.db.begin_transaction().await?;

        let current = self.repository.lock_review(&mut tx, review).await?;

        if !current.status.can_moderate_to(status) {
            return Err(ReviewsServiceError::InvalidStatusChange {
                from: current.status,
                to: status,
            });
        }

        let updated = self
            .repository
            .update_status(&mut tx, review, status)
            .await?;

        tx.commit().await?;

        info!("moderated review");

        Ok(updated)
    }

    async fn list_product_reviews(
        &self,
        product: ProductUuid,
        page: PageRequest,
    ) -> Result<Page<ReviewRecord>, ReviewsServiceError> {
        self.list_in_status(Some(product), ReviewStatus::Approved, page)
            .await
    }

    async fn list_pending_reviews(
        &self,
        caller: Caller,
        page: PageRequest,
    ) -> Result<Page<ReviewRecord>, ReviewsServiceError> {
        if !caller.is_admin() {
            return Err(ReviewsServiceError::PermissionDenied);
        }

        self.list_in_status(None, ReviewStatus::Pending, page).await
    }
}

#[automock]
#[async_trait]
pub trait ReviewsService: Send + Sync {
    /// Whether `user` may review `product`: they must have received it and not reviewed it yet.
    async fn can_review(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<ReviewEligibility, ReviewsServiceError>;

    /// Submit a review for moderation.
    async fn create_review(
        &self,
        user: UserUuid,
        product: ProductUuid,
        review: NewReview,
    ) -> Result<ReviewRecord, ReviewsServiceError>;

    /// Approve or reject a pending review. Administrators only.
    async fn update_status(
        &self,
        caller: Caller,
        review: ReviewUuid,
        status: ReviewStatus,
    ) -> Result<ReviewRecord, ReviewsServiceError>;

    /// Approved reviews of a product, newest first.
    async fn list_product_reviews(
        &self,
        product: ProductUuid,
        page: PageRequest,
    ) -> Result<Page<ReviewRecord>, ReviewsServiceError>;

    /// Reviews awaiting moderation, newest first. Administrators only.
    async fn list_pending_reviews(
        &self,
        caller: Caller,
        page: PageRequest,
    ) -> Result<Page<ReviewRecord>, ReviewsServiceError>;
}

#[cfg(test)]
mod tests {
    use storefront::orders::OrderStatus;
    use testresult::TestResult;

    use crate::{domain::reviews::records::EligibilityReason, test::TestContext};

    use super::*;

    fn review(rating: u8) -> NewReview {
        NewReview {
            rating,
            comment: Some("Solid".to_string()),
        }
    }

    async fn pending_review(ctx: &TestContext, product: ProductUuid) -> TestResult<ReviewRecord> {
        let user = UserUuid::new();

        let order = ctx.place_order(user, product, 1).await?;
        ctx.advance_order(order.uuid, OrderStatus::Delivered).await?;

        Ok(ctx.reviews.create_review(user, product, review(5)).await?)
    }

    fn moderator() -> Caller {
        Caller::admin(UserUuid::new())
    }

    #[tokio::test]
    async fn can_review_requires_a_purchase() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;

        let eligibility = ctx.reviews.can_review(UserUuid::new(), product).await?;

        assert!(!eligibility.allowed);
        assert_eq!(eligibility.reason, EligibilityReason::NotPurchased);

        Ok(())
    }

    #[tokio::test]
    async fn can_review_requires_delivery() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;
        let user = UserUuid::new();

        ctx.place_order(user, product, 1).await?;

        let eligibility = ctx.reviews.can_review(user, product).await?;

        assert_eq!(eligibility.reason, EligibilityReason::NotPurchased);

        Ok(())
    }

    #[tokio::test]
    async fn delivered_purchase_allows_exactly_one_review() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;
        let user = UserUuid::new();

        let order = ctx.place_order(user, product, 1).await?;
        ctx.advance_order(order.uuid, OrderStatus::Delivered).await?;

        assert!(ctx.reviews.can_review(user, product).await?.allowed);

        let created = ctx.reviews.create_review(user, product, review(4)).await?;

        assert_eq!(created.rating, 4);
        assert_eq!(created.status, ReviewStatus::Pending);

        let eligibility = ctx.reviews.can_review(user, product).await?;

        assert!(!eligibility.allowed);
        assert_eq!(eligibility.reason, EligibilityReason::AlreadyReviewed);

        let second = ctx.reviews.create_review(user, product, review(5)).await;

        assert!(
            matches!(
                second,
                Err(ReviewsServiceError::NotEligible(
                    EligibilityReason::AlreadyReviewed
                ))
            ),
            "expected NotEligible, got {second:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_review_rejects_out_of_range_rating() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;

        for rating in [0, 6] {
            let result = ctx
                .reviews
                .create_review(UserUuid::new(), product, review(rating))
                .await;

            assert!(
                matches!(result, Err(ReviewsServiceError::InvalidRating(r)) if r == rating),
                "expected InvalidRating, got {result:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn approved_reviews_are_listed_for_the_product() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;
        let created = pending_review(&ctx, product).await?;

        let before = ctx
            .reviews
            .list_product_reviews(product, PageRequest::default())
            .await?;

        assert!(before.data.is_empty(), "pending reviews must not be listed");
        assert_eq!(before.total, 0);

        let approved = ctx
            .reviews
            .update_status(moderator(), created.uuid, ReviewStatus::Approved)
            .await?;

        assert_eq!(approved.status, ReviewStatus::Approved);

        let after = ctx
            .reviews
            .list_product_reviews(product, PageRequest::default())
            .await?;

        assert_eq!(after.total, 1);
        assert_eq!(after.data.len(), 1);
        assert_eq!(after.data[0].uuid, created.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn rejected_reviews_stay_hidden() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;
        let created = pending_review(&ctx, product).await?;

        let rejected = ctx
            .reviews
            .update_status(moderator(), created.uuid, ReviewStatus::Rejected)
            .await?;

        assert_eq!(rejected.status, ReviewStatus::Rejected);

        let listed = ctx
            .reviews
            .list_product_reviews(product, PageRequest::default())
            .await?;

        assert!(listed.data.is_empty());

        let pending = ctx
            .reviews
            .list_pending_reviews(moderator(), PageRequest::default())
            .await?;

        assert!(pending.data.iter().all(|r| r.uuid != created.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn product_reviews_are_paged() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 10).await?;

        for _ in 0..3 {
            let created = pending_review(&ctx, product).await?;

            ctx.reviews
                .update_status(moderator(), created.uuid, ReviewStatus::Approved)
                .await?;
        }

        let first = ctx
            .reviews
            .list_product_reviews(product, PageRequest::new(1, 2))
            .await?;
        let second = ctx
            .reviews
            .list_product_reviews(product, PageRequest::new(2, 2))
            .await?;

        assert_eq!(first.total, 3);
        assert_eq!(first.last_page, 2);
        assert_eq!(first.data.len(), 2);
        assert_eq!(second.data.len(), 1);
        assert!(
            first
                .data
                .iter()
                .all(|r| r.uuid != second.data[0].uuid)
        );

        Ok(())
    }

    #[tokio::test]
    async fn customers_cannot_moderate_reviews() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;
        let created = pending_review(&ctx, product).await?;

        let result = ctx
            .reviews
            .update_status(
                Caller::customer(created.user_uuid),
                created.uuid,
                ReviewStatus::Approved,
            )
            .await;

        assert!(
            matches!(result, Err(ReviewsServiceError::PermissionDenied)),
            "expected PermissionDenied, got {result:?}"
        );

        let pending = ctx
            .reviews
            .list_pending_reviews(Caller::customer(created.user_uuid), PageRequest::default())
            .await;

        assert!(matches!(pending, Err(ReviewsServiceError::PermissionDenied)));

        Ok(())
    }

    #[tokio::test]
    async fn moderated_review_cannot_be_moderated_again() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;
        let created = pending_review(&ctx, product).await?;

        ctx.reviews
            .update_status(moderator(), created.uuid, ReviewStatus::Approved)
            .await?;

        let result = ctx
            .reviews
            .update_status(moderator(), created.uuid, ReviewStatus::Rejected)
            .await;

        assert!(
            matches!(
                result,
                Err(ReviewsServiceError::InvalidStatusChange {
                    from: ReviewStatus::Approved,
                    to: ReviewStatus::Rejected,
                })
            ),
            "expected InvalidStatusChange, got {result:?}"
        );

        let back_to_pending = ctx
            .reviews
            .update_status(moderator(), created.uuid, ReviewStatus::Pending)
            .await;

        assert!(matches!(
            back_to_pending,
            Err(ReviewsServiceError::InvalidStatusChange { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn moderating_unknown_review_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .reviews
            .update_status(moderator(), ReviewUuid::new(), ReviewStatus::Approved)
            .await;

        assert!(
            matches!(result, Err(ReviewsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn pending_queue_lists_reviews_awaiting_moderation() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.create_product(5_00, 5).await?;
        let created = pending_review(&ctx, product).await?;

        let pending = ctx
            .reviews
            .list_pending_reviews(moderator(), PageRequest::default())
            .await?;

        assert!(pending.data.iter().any(|r| r.uuid == created.uuid));
        assert!(
            pending
                .data
                .iter()
                .all(|r| r.status == ReviewStatus::Pending)
        );

        Ok(())
    }
}
