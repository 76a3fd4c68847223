use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, types::Json, FromRow, Row, Type};
pub use storefront_common::{DiscountRate, Money};

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------       LineItem        ---------------------------------------------------------
/// A single line of an order (or a cart): which catalog item, at what unit price, and how many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// The catalog identifier of the item
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Unit price
    pub price: Money,
    pub quantity: i64,
}

impl LineItem {
    pub fn new<S: Into<String>, T: Into<String>>(id: S, title: T, price: Money, quantity: i64) -> Self {
        Self { id: id.into(), title: title.into(), price, quantity }
    }

    pub fn line_total(&self) -> Money {
        #[allow(clippy::cast_precision_loss)]
        let quantity = self.quantity as f64;
        self.price * quantity
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
/// An order as recorded in the ledger. Orders are never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub discount_applied: DiscountRate,
    pub total_price: Money,
    pub name: String,
    pub address: String,
    pub coupon_used: Option<String>,
    /// Set when the order was placed with a coupon. Kept alongside the code so that older clients can rely on it.
    #[serde(default)]
    pub used_coupon: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The amount knocked off the subtotal by the coupon, if any.
    pub fn discount_amount(&self) -> Money {
        self.subtotal - self.total_price
    }
}

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let Json(items) = row.try_get::<Json<Vec<LineItem>>, _>("items")?;
        Ok(Self {
            id: row.try_get("id")?,
            items,
            subtotal: row.try_get("subtotal")?,
            discount_applied: row.try_get("discount")?,
            total_price: row.try_get("total_price")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            coupon_used: row.try_get("coupon_used")?,
            used_coupon: row.try_get("used_coupon")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// A fully-formed order, ready to be appended to the ledger.
///
/// The constructors derive `subtotal` and `total_price` from the line items and discount, so a `NewOrder` built with
/// [`NewOrder::new`] and [`NewOrder::with_coupon`] always satisfies `total_price = subtotal * (1 - discount_applied)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub discount_applied: DiscountRate,
    pub total_price: Money,
    pub name: String,
    pub address: String,
    pub coupon_used: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(items: Vec<LineItem>, name: String, address: String) -> Self {
        let subtotal = items.iter().map(LineItem::line_total).sum();
        Self {
            items,
            subtotal,
            discount_applied: DiscountRate::zero(),
            total_price: subtotal,
            name,
            address,
            coupon_used: None,
            created_at: Utc::now(),
        }
    }

    /// Applies the coupon's rate to this order and records the code against it.
    pub fn with_coupon(mut self, code: String, rate: DiscountRate) -> Self {
        self.coupon_used = Some(code);
        self.discount_applied = rate;
        self.total_price = rate.apply(self.subtotal);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Checks the pricing invariant: the total is exactly the discounted subtotal.
    pub fn is_consistent(&self) -> bool {
        self.total_price == self.discount_applied.apply(self.subtotal)
    }
}

//--------------------------------------         Coupon        ---------------------------------------------------------
/// The storefront's shared discount coupon. At most one coupon is unused at any time; redeemed coupons are kept as an
/// audit trail.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub discount: DiscountRate,
    pub used: bool,
    pub created_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn is_available(&self) -> bool {
        !self.used
    }
}

impl Display for Coupon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.used { "used" } else { "available" };
        write!(f, "[{}] {} off ({state})", self.code, self.discount)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub code: String,
    pub discount: DiscountRate,
    pub created_at: DateTime<Utc>,
}

impl NewCoupon {
    pub fn new(code: String, discount: DiscountRate) -> Self {
        Self { code, discount, created_at: Utc::now() }
    }
}

//--------------------------------------       MintOutcome     ---------------------------------------------------------
/// The result of an attempt to create the available coupon.
#[derive(Debug, Clone, PartialEq)]
pub enum MintOutcome {
    /// The coupon was created and is now the available coupon.
    Created(Coupon),
    /// Another coupon was already available (possibly minted concurrently). Nothing was written.
    AlreadyAvailable(Coupon),
    /// No coupon is available, but the proposed code belongs to an older coupon. Nothing was written.
    CodeTaken(String),
}
