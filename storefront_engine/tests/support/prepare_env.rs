use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use storefront_engine::{
    db_types::{LineItem, Money, NewOrder},
    traits::StorefrontDatabase,
    SqliteDatabase,
};

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    let db = SqliteDatabase::new_with_url(url, 25).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("storefront_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn tear_down(mut db: SqliteDatabase) {
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(db.url()).await {
        warn!("🚀️ Failed to drop test database {}: {e}", db.url());
    }
}

pub fn sample_items() -> Vec<LineItem> {
    vec![
        LineItem::new("item1", "Product 1", Money::from(30.0), 2),
        LineItem::new("item2", "Product 2", Money::from(60.0), 1),
    ]
}

pub fn order_at(created_at: DateTime<Utc>) -> NewOrder {
    NewOrder::new(sample_items(), "Alice".into(), "1 Main St".into()).with_created_at(created_at)
}

pub async fn available_coupon_count(db: &SqliteDatabase) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM coupons WHERE used = 0").fetch_one(db.pool()).await.unwrap()
}
