use std::sync::Arc;

use crate::{
    config::RecommenderSettings,
    services::Recommender,
    stores::{OrderStore, ProductStore},
};

/// Shared application state
///
/// Holds handles to the backing stores plus the recommendation tuning
/// settings. The stores are trait objects so the same state works over
/// Postgres in production and the in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderStore>,
    pub products: Arc<dyn ProductStore>,
    pub settings: RecommenderSettings,
    pub default_limit: usize,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        settings: RecommenderSettings,
        default_limit: usize,
    ) -> Self {
        Self {
            orders,
            products,
            settings,
            default_limit,
        }
    }

    /// Builds a pipeline instance over this state's stores
    ///
    /// The recommender is stateless, so constructing one per request is free.
    pub fn recommender(&self) -> Recommender {
        Recommender::new(
            self.orders.clone(),
            self.products.clone(),
            self.settings.clone(),
        )
    }
}
