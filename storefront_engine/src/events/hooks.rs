use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    CouponMintedEvent,
    CouponRedeemedEvent,
    EventHandler,
    EventProducer,
    Handler,
    MintFailedEvent,
    OrderCreatedEvent,
};

type BoxedHookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_created_producer: Vec<EventProducer<OrderCreatedEvent>>,
    pub coupon_minted_producer: Vec<EventProducer<CouponMintedEvent>>,
    pub coupon_redeemed_producer: Vec<EventProducer<CouponRedeemedEvent>>,
    pub mint_failed_producer: Vec<EventProducer<MintFailedEvent>>,
}

pub struct EventHandlers {
    pub on_order_created: Option<EventHandler<OrderCreatedEvent>>,
    pub on_coupon_minted: Option<EventHandler<CouponMintedEvent>>,
    pub on_coupon_redeemed: Option<EventHandler<CouponRedeemedEvent>>,
    pub on_mint_failed: Option<EventHandler<MintFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        Self {
            on_order_created: hooks.on_order_created.map(|f| EventHandler::new(buffer_size, f)),
            on_coupon_minted: hooks.on_coupon_minted.map(|f| EventHandler::new(buffer_size, f)),
            on_coupon_redeemed: hooks.on_coupon_redeemed.map(|f| EventHandler::new(buffer_size, f)),
            on_mint_failed: hooks.on_mint_failed.map(|f| EventHandler::new(buffer_size, f)),
        }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_created {
            result.order_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_coupon_minted {
            result.coupon_minted_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_coupon_redeemed {
            result.coupon_redeemed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_mint_failed {
            result.mint_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub fn start_handlers(self) {
        if let Some(handler) = self.on_order_created {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_coupon_minted {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_coupon_redeemed {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_mint_failed {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_created: Option<Handler<OrderCreatedEvent>>,
    pub on_coupon_minted: Option<Handler<CouponMintedEvent>>,
    pub on_coupon_redeemed: Option<Handler<CouponRedeemedEvent>>,
    pub on_mint_failed: Option<Handler<MintFailedEvent>>,
}

impl EventHooks {
    pub fn on_order_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCreatedEvent) -> BoxedHookFuture) + Send + Sync + 'static {
        self.on_order_created = Some(Arc::new(f));
        self
    }

    pub fn on_coupon_minted<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(CouponMintedEvent) -> BoxedHookFuture) + Send + Sync + 'static {
        self.on_coupon_minted = Some(Arc::new(f));
        self
    }

    pub fn on_coupon_redeemed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(CouponRedeemedEvent) -> BoxedHookFuture) + Send + Sync + 'static {
        self.on_coupon_redeemed = Some(Arc::new(f));
        self
    }

    pub fn on_mint_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MintFailedEvent) -> BoxedHookFuture) + Send + Sync + 'static {
        self.on_mint_failed = Some(Arc::new(f));
        self
    }
}
