use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Coupon, LineItem, Money, Order},
    sf_api::errors::OrderIntakeError,
};

/// The largest quantity a single line item may carry.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// An order as submitted by a customer.
///
/// The pricing fields are whatever the client calculated. They are accepted so that existing clients keep working, but
/// the intake coordinator always recomputes the prices itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub subtotal: Option<Money>,
    #[serde(default)]
    pub discount_applied: Option<f64>,
    #[serde(default)]
    pub total_price: Option<Money>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coupon_used: Option<String>,
}

impl OrderRequest {
    pub fn new<S: Into<String>, T: Into<String>>(items: Vec<LineItem>, name: S, address: T) -> Self {
        Self { items, name: name.into(), address: address.into(), ..Default::default() }
    }

    pub fn with_coupon<S: Into<String>>(mut self, code: S) -> Self {
        self.coupon_used = Some(code.into());
        self
    }

    /// The coupon code the customer wants to use, if they supplied a non-blank one.
    pub fn coupon_code(&self) -> Option<String> {
        self.coupon_used.as_deref().map(str::trim).filter(|c| !c.is_empty()).map(String::from)
    }

    /// Checks that the order is complete and sane. The first problem found is reported.
    pub fn validate(&self) -> Result<(), OrderIntakeError> {
        if self.items.is_empty() {
            return Err(OrderIntakeError::invalid("items", "An order must contain at least one item"));
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(OrderIntakeError::invalid(format!("items[{i}].id"), "Item id is required"));
            }
            if item.quantity <= 0 || item.quantity > MAX_QUANTITY {
                return Err(OrderIntakeError::invalid(
                    format!("items[{i}].quantity"),
                    format!("Quantity must be between 1 and {MAX_QUANTITY}. Got {}", item.quantity),
                ));
            }
            if !item.price.is_valid_price() {
                return Err(OrderIntakeError::invalid(
                    format!("items[{i}].price"),
                    format!("Price must be a non-negative number. Got {}", item.price.value()),
                ));
            }
        }
        let subtotal: Money = self.items.iter().map(LineItem::line_total).sum();
        if !subtotal.is_valid_price() {
            return Err(OrderIntakeError::invalid("items", "The order total is too large to be priced"));
        }
        if self.name.trim().is_empty() {
            return Err(OrderIntakeError::invalid("name", "Customer name is required"));
        }
        if self.address.trim().is_empty() {
            return Err(OrderIntakeError::invalid("address", "Customer address is required"));
        }
        Ok(())
    }
}

/// The result of a successful order submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedOrder {
    /// The order, as stored in the ledger
    pub order: Order,
    /// The coupon that is available once this order has been processed, if any
    pub coupon_offer: Option<Coupon>,
}

/// Narrows a ledger lookup. An empty filter matches every order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub coupon_used: Option<bool>,
}

impl OrderQueryFilter {
    pub fn with_coupon_used(mut self, used: bool) -> Self {
        self.coupon_used = Some(used);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.coupon_used.is_none()
    }
}
