use crate::{
    db_types::{Coupon, MintOutcome, NewCoupon},
    traits::StoreError,
};

/// Storage for the shared discount coupon and the audit trail of redeemed coupons.
#[allow(async_fn_in_trait)]
pub trait CouponStore {
    /// Fetches the coupon that is currently available for use, if any.
    async fn fetch_available_coupon(&self) -> Result<Option<Coupon>, StoreError>;

    /// Fetches a coupon by its code, whether it has been used or not.
    async fn fetch_coupon(&self, code: &str) -> Result<Option<Coupon>, StoreError>;

    /// Fetches the most recently created coupon that has been redeemed.
    async fn fetch_last_redeemed_coupon(&self) -> Result<Option<Coupon>, StoreError>;

    /// Creates `coupon` as the available coupon, but only if no other coupon is currently available.
    ///
    /// This must be a single atomic conditional write. When several callers race, exactly one of them gets
    /// [`MintOutcome::Created`] and the rest see [`MintOutcome::AlreadyAvailable`] with the winner's coupon. If the
    /// code clashes with an older, redeemed coupon, nothing is written and [`MintOutcome::CodeTaken`] is returned.
    async fn insert_coupon_if_none_available(&self, coupon: NewCoupon) -> Result<MintOutcome, StoreError>;

    /// Marks the coupon as used, atomically.
    ///
    /// Exactly one of several concurrent redemptions of the same code succeeds. The others fail with
    /// [`StoreError::CouponAlreadyUsed`]. Unknown codes fail with [`StoreError::CouponNotFound`].
    async fn redeem_coupon(&self, code: &str) -> Result<Coupon, StoreError>;
}
