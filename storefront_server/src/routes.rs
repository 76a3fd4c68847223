//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into the engine's API layer. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every storage call made from here is async, so a slow SQLite write
//! only parks the request that is waiting on it.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    db_types::OrderId,
    order_objects::OrderRequest,
    traits::{OrderLedger, StorefrontDatabase},
    CouponApi,
    LedgerApi,
    MintDecision,
    OrderIntakeApi,
};

use crate::{
    data_objects::{CouponResponse, OrderCreatedResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Coupons  ----------------------------------------------------
route!(available_coupon => Get "/coupons" impl StorefrontDatabase);
/// The coupon customers can use right now. This never mints a coupon; it only reports the one that is available.
pub async fn available_coupon<B: StorefrontDatabase>(
    api: web::Data<CouponApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET available coupon");
    let coupon = api.current_available().await?;
    let message = if coupon.is_some() { "Unused coupon found" } else { "No unused coupon available" };
    Ok(HttpResponse::Ok().json(CouponResponse::new(message, coupon)))
}

route!(admin_discount => Get "/admin/discount" impl StorefrontDatabase);
/// Returns the available coupon, minting one first if enough orders have been placed since the last redemption.
///
/// Not being eligible yet is not an error. The response carries a `null` coupon and explains how many orders are
/// needed.
pub async fn admin_discount<B: StorefrontDatabase>(
    api: web::Data<CouponApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin discount");
    let response = match api.check_and_mint().await? {
        MintDecision::Existing(coupon) => CouponResponse::new("Coupon fetched successfully", Some(coupon)),
        MintDecision::Minted(coupon) => CouponResponse::new("Coupon generated successfully", Some(coupon)),
        MintDecision::NotEligible { orders_since, threshold } => {
            debug!("💻️ {orders_since} of {threshold} orders placed. No coupon yet.");
            let message = format!(
                "Condition not satisfied. At least {threshold} orders are required since the last discount code was \
                 used."
            );
            CouponResponse::new(message, None)
        },
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(orders => Get "/orders" impl OrderLedger);
/// Every order in the ledger, most recent first.
pub async fn orders<B: OrderLedger>(api: web::Data<LedgerApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET orders");
    let orders = api.orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderLedger);
pub async fn order_by_id<B: OrderLedger>(
    path: web::Path<i64>,
    api: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId::from(path.into_inner());
    trace!("💻️ GET order {id}");
    let order = api.order_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Order {id}")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(submit_order => Post "/orders" impl StorefrontDatabase);
/// Places a new order.
///
/// The prices in the request body are informational only. The order is priced from its line items and the stored rate
/// of the coupon it names, if any. The response includes whichever coupon is available once the order has been
/// accepted, so the storefront can show it to the next customer.
pub async fn submit_order<B: StorefrontDatabase>(
    body: web::Json<OrderRequest>,
    api: web::Data<OrderIntakeApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST order for {} ({} line items)", request.name, request.items.len());
    let submitted = api.submit(request).await?;
    Ok(HttpResponse::Ok().json(OrderCreatedResponse::from(submitted)))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(admin_stats => Get "/admin" impl OrderLedger);
/// Sales and discount totals over the whole ledger.
pub async fn admin_stats<B: OrderLedger>(api: web::Data<LedgerApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET admin stats");
    let stats = api.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

route!(admin_diagnostics => Get "/admin/diagnostics" impl StorefrontDatabase);
/// Counts of the order-intake problems that do not fail the order: lost redemption races and failed mints.
pub async fn admin_diagnostics<B: StorefrontDatabase>(
    api: web::Data<OrderIntakeApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET admin diagnostics");
    Ok(HttpResponse::Ok().json(api.diagnostics().snapshot()))
}
