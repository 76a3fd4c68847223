use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::db_types::{Coupon, NewCoupon};

pub async fn fetch_available_coupon(conn: &mut SqliteConnection) -> Result<Option<Coupon>, sqlx::Error> {
    let coupon = sqlx::query_as("SELECT * FROM coupons WHERE used = 0 LIMIT 1").fetch_optional(conn).await?;
    Ok(coupon)
}

pub async fn fetch_coupon(code: &str, conn: &mut SqliteConnection) -> Result<Option<Coupon>, sqlx::Error> {
    let coupon = sqlx::query_as("SELECT * FROM coupons WHERE code = $1").bind(code).fetch_optional(conn).await?;
    Ok(coupon)
}

/// The most recently created coupon that has been redeemed.
pub async fn fetch_last_redeemed_coupon(conn: &mut SqliteConnection) -> Result<Option<Coupon>, sqlx::Error> {
    let coupon = sqlx::query_as("SELECT * FROM coupons WHERE used = 1 ORDER BY created_at DESC LIMIT 1")
        .fetch_optional(conn)
        .await?;
    Ok(coupon)
}

/// Inserts the coupon unless doing so would violate a uniqueness constraint.
///
/// The `coupons` table carries a partial unique index over unused coupons, so the insert is skipped both when another
/// coupon is already available and when the code is taken. Returns `None` in either case. Run this inside a
/// transaction and follow up with [`fetch_available_coupon`] to tell the two cases apart.
pub async fn insert_coupon_if_absent(
    coupon: NewCoupon,
    conn: &mut SqliteConnection,
) -> Result<Option<Coupon>, sqlx::Error> {
    let inserted: Option<Coupon> = sqlx::query_as(
        r#"
            INSERT INTO coupons (code, discount, used, created_at)
            VALUES ($1, $2, 0, $3)
            ON CONFLICT DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(coupon.code)
    .bind(coupon.discount)
    .bind(coupon.created_at)
    .fetch_optional(conn)
    .await?;
    match &inserted {
        Some(c) => debug!("🎟️ Coupon {c} inserted"),
        None => trace!("🎟️ Coupon insert skipped because of a uniqueness conflict"),
    }
    Ok(inserted)
}

/// Flips the coupon's `used` flag if, and only if, it is still unused. Returns the updated coupon, or `None` if the code
/// is unknown or the coupon had already been redeemed.
pub async fn redeem_coupon(
    code: &str,
    redeemed_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Coupon>, sqlx::Error> {
    let coupon = sqlx::query_as("UPDATE coupons SET used = 1, redeemed_at = $2 WHERE code = $1 AND used = 0 RETURNING *")
        .bind(code)
        .bind(redeemed_at)
        .fetch_optional(conn)
        .await?;
    Ok(coupon)
}
