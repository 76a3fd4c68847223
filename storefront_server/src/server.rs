use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, error, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use storefront_engine::{
    events::EventProducers,
    CouponApi,
    IntakeDiagnostics,
    LedgerApi,
    OrderIntakeApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    event_log::create_event_log_handlers,
    routes::{
        health,
        AdminDiagnosticsRoute,
        AdminDiscountRoute,
        AdminStatsRoute,
        AvailableCouponRoute,
        OrderByIdRoute,
        OrdersRoute,
        SubmitOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::open(&config.database_url, config.db_max_connections, config.use_wal)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_event_log_handlers();
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    // Every worker builds its own API objects, but they all count into the same diagnostics
    let diagnostics = Arc::new(IntakeDiagnostics::default());
    let srv = HttpServer::new(move || {
        let coupon_api = CouponApi::new(db.clone(), producers.clone())
            .with_policy(config.coupon_policy.clone())
            .with_retry_config(config.retry.clone());
        let intake_api = OrderIntakeApi::new(db.clone(), producers.clone())
            .with_coupon_policy(config.coupon_policy.clone())
            .with_stale_coupon_policy(config.stale_coupon_policy)
            .with_retry_config(config.retry.clone())
            .with_diagnostics(Arc::clone(&diagnostics));
        let ledger_api = LedgerApi::new(db.clone()).with_retry_config(config.retry.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("storefront::access_log"))
            .app_data(web::Data::new(coupon_api))
            .app_data(web::Data::new(intake_api))
            .app_data(web::Data::new(ledger_api))
            .configure(configure_extractors)
            .service(health)
            .service(AvailableCouponRoute::<SqliteDatabase>::new())
            .service(AdminDiscountRoute::<SqliteDatabase>::new())
            .service(AdminDiagnosticsRoute::<SqliteDatabase>::new())
            .service(AdminStatsRoute::<SqliteDatabase>::new())
            .service(OrdersRoute::<SqliteDatabase>::new())
            .service(SubmitOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("💻️ Listening on {}:{}", config.host, config.port);
    Ok(srv)
}

/// Malformed bodies and paths are reported with the same JSON error shape as every other failure.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Rejected request body. {err}");
        error::Error::from(ServerError::InvalidRequestBody(err.to_string()))
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        debug!("💻️ Rejected request path. {err}");
        error::Error::from(ServerError::InvalidRequestPath(err.to_string()))
    }));
}
