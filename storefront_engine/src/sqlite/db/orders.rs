use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId},
    order_objects::OrderQueryFilter,
};

/// Appends a new order to the ledger using the given connection, and returns the stored record.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let used_coupon = order.coupon_used.is_some();
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                items,
                subtotal,
                discount,
                total_price,
                name,
                address,
                coupon_used,
                used_coupon,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(Json(&order.items))
    .bind(order.subtotal)
    .bind(order.discount_applied)
    .bind(order.total_price)
    .bind(order.name)
    .bind(order.address)
    .bind(order.coupon_used)
    .bind(used_coupon)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {} appended to the ledger. Total: {}", order.id, order.total_price);
    Ok(order)
}

pub async fn fetch_order_by_id(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Counts the orders created strictly after `since`. If `since` is `None`, all orders are counted.
pub async fn count_orders(since: Option<DateTime<Utc>>, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let count: i64 = match since {
        Some(since) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at > $1").bind(since).fetch_one(conn).await?
        },
        None => sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(conn).await?,
    };
    trace!("📝️ {count} orders since {since:?}");
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Fetches all orders in the ledger, most recent first. Orders created in the same instant are ordered by id.
pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(orders)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in descending order. If `limit` is given, at most that many orders are
/// returned.
pub async fn search_orders(
    query: OrderQueryFilter,
    limit: Option<u32>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(used) = query.coupon_used {
        where_clause.push("used_coupon = ");
        where_clause.push_bind_unseparated(used);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(limit));
    }

    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📝️ Result of search_orders: {}", orders.len());
    Ok(orders)
}

/// The most recent order matching the filter.
pub async fn latest_order_where(
    query: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let mut orders = search_orders(query, Some(1), conn).await?;
    Ok(orders.pop())
}
