//! A customer's shopping cart.
//!
//! The cart is local state only. It never touches the ledger; [`Cart::to_order_request`] turns it into the request a
//! client submits. It serializes to JSON so a client can persist it between sessions.
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{DiscountRate, LineItem, Money},
    order_objects::OrderRequest,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds the item to the cart. If the cart already holds an item with the same id, the quantities are merged.
    /// Items with a non-positive quantity are ignored. Merged quantities stop at `i64::MAX`.
    pub fn add(&mut self, item: LineItem) {
        if item.quantity <= 0 {
            return;
        }
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<LineItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Sets the quantity of an item already in the cart. A quantity of zero or less removes it.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Builds the order request for this cart, including the client's own view of the prices.
    pub fn to_order_request<S: Into<String>, T: Into<String>>(
        &self,
        name: S,
        address: T,
        coupon: Option<(&str, DiscountRate)>,
    ) -> OrderRequest {
        let subtotal = self.subtotal();
        let rate = coupon.map(|(_, rate)| rate).unwrap_or_default();
        OrderRequest {
            items: self.items.clone(),
            subtotal: Some(subtotal),
            discount_applied: Some(rate.value()),
            total_price: Some(rate.apply(subtotal)),
            name: name.into(),
            address: address.into(),
            coupon_used: coupon.map(|(code, _)| code.to_string()),
        }
    }
}
