use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    OrderCanceledEvent,
    OrderPlacedEvent,
    PriceListUpdatedEvent,
    UserRegisteredEvent,
};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub user_registered_producer: Vec<EventProducer<UserRegisteredEvent>>,
    pub order_placed_producer: Vec<EventProducer<OrderPlacedEvent>>,
    pub order_canceled_producer: Vec<EventProducer<OrderCanceledEvent>>,
    pub price_list_updated_producer: Vec<EventProducer<PriceListUpdatedEvent>>,
}

pub struct EventHandlers {
    pub on_user_registered: Option<EventHandler<UserRegisteredEvent>>,
    pub on_order_placed: Option<EventHandler<OrderPlacedEvent>>,
    pub on_order_canceled: Option<EventHandler<OrderCanceledEvent>>,
    pub on_price_list_updated: Option<EventHandler<PriceListUpdatedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_user_registered = hooks.on_user_registered.map(|f| EventHandler::new(buffer_size, f));
        let on_order_placed = hooks.on_order_placed.map(|f| EventHandler::new(buffer_size, f));
        let on_order_canceled = hooks.on_order_canceled.map(|f| EventHandler::new(buffer_size, f));
        let on_price_list_updated = hooks.on_price_list_updated.map(|f| EventHandler::new(buffer_size, f));
        Self { on_user_registered, on_order_placed, on_order_canceled, on_price_list_updated }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_user_registered {
            result.user_registered_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_placed {
            result.order_placed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_canceled {
            result.order_canceled_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_price_list_updated {
            result.price_list_updated_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_user_registered {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_order_placed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_order_canceled {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_price_list_updated {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_user_registered: Option<Handler<UserRegisteredEvent>>,
    pub on_order_placed: Option<Handler<OrderPlacedEvent>>,
    pub on_order_canceled: Option<Handler<OrderCanceledEvent>>,
    pub on_price_list_updated: Option<Handler<PriceListUpdatedEvent>>,
}

impl EventHooks {
    pub fn on_user_registered<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(UserRegisteredEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_user_registered = Some(Arc::new(f));
        self
    }

    pub fn on_order_placed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderPlacedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_placed = Some(Arc::new(f));
        self
    }

    pub fn on_order_canceled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCanceledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_canceled = Some(Arc::new(f));
        self
    }

    pub fn on_price_list_updated<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PriceListUpdatedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_price_list_updated = Some(Arc::new(f));
        self
    }
}
