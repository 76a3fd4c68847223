//! Sales and discount statistics for the admin view.
//!
//! [`summarize`] is a pure fold over the ledger, so it can run over any snapshot of orders.
use serde::{Deserialize, Serialize};

use crate::db_types::{Money, Order};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Sum of the amounts actually charged
    pub total_purchase_amount: Money,
    /// Sum of the amounts knocked off by coupons
    pub total_discount_amount: Money,
    /// Every distinct coupon code used, in the order it was first seen
    pub discount_codes_used: Vec<String>,
    /// Units sold per item, in the order each item was first seen
    pub item_sales: Vec<ItemSales>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSales {
    pub id: String,
    pub title: String,
    pub count: i64,
}

impl Stats {
    pub fn item(&self, id: &str) -> Option<&ItemSales> {
        self.item_sales.iter().find(|s| s.id == id)
    }
}

pub fn summarize(orders: &[Order]) -> Stats {
    orders.iter().fold(Stats::default(), |mut stats, order| {
        stats.total_purchase_amount += order.total_price;
        stats.total_discount_amount += order.discount_amount();
        if let Some(code) = order.coupon_used.as_deref().filter(|c| !c.is_empty()) {
            if !stats.discount_codes_used.iter().any(|c| c == code) {
                stats.discount_codes_used.push(code.to_string());
            }
        }
        for item in &order.items {
            match stats.item_sales.iter_mut().find(|s| s.id == item.id) {
                Some(sales) => sales.count = sales.count.saturating_add(item.quantity),
                None => stats.item_sales.push(ItemSales {
                    id: item.id.clone(),
                    title: item.title.clone(),
                    count: item.quantity,
                }),
            }
        }
        stats
    })
}
