use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Order, Product},
    stores::{AttributeFilter, OrderStore, ProductStore},
};

/// In-memory backing store
///
/// Holds the catalog and order history in plain vectors and answers the store
/// queries with deterministic ordering. Used by the test suites so the whole
/// pipeline runs without Postgres or Redis; also handy for local demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    products: Vec<Product>,
    orders: Vec<Order>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
    }

    pub fn add_order(&mut self, order: Order) {
        self.orders.push(order);
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryStore {
    async fn orders_for_shopper(&self, shopper_id: Uuid) -> AppResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.shopper_id == shopper_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }

    async fn orders_containing_any_of(&self, product_ids: &[Uuid]) -> AppResult<Vec<Order>> {
        let wanted: HashSet<Uuid> = product_ids.iter().copied().collect();
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.lines.iter().any(|line| wanted.contains(&line.product_id)))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryStore {
    async fn products_by_id(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        let wanted: HashSet<Uuid> = ids.iter().copied().collect();
        Ok(self
            .products
            .iter()
            .filter(|p| wanted.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn products_matching(
        &self,
        filter: &AttributeFilter,
        excluding: &HashSet<Uuid>,
        limit: usize,
    ) -> AppResult<Vec<Product>> {
        let mut matches: Vec<Product> = self
            .products
            .iter()
            .filter(|p| !excluding.contains(&p.id) && filter.matches(p))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn latest_products(&self, limit: usize) -> AppResult<Vec<Product>> {
        let mut products = self.products.clone();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        products.truncate(limit);
        Ok(products)
    }
}
