/// Backing-store abstraction
///
/// The recommender reads orders and products through these capability traits
/// rather than talking to a concrete database, so the pipeline can be
/// exercised against an in-memory store (or a mock) without any network
/// dependency. Both traits are read-only: the recommender never writes.
use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Order, Product},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{PgOrderStore, PgProductStore};

/// Read-only view of the order history
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders placed by the shopper, most recent first
    ///
    /// An unknown shopper id yields an empty list, not an error.
    async fn orders_for_shopper(&self, shopper_id: Uuid) -> AppResult<Vec<Order>>;

    /// All orders containing at least one line referencing any of the given
    /// products, most recent first
    async fn orders_containing_any_of(&self, product_ids: &[Uuid]) -> AppResult<Vec<Order>>;
}

/// Read-only view of the product catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Resolves product ids to full records; ids with no backing product are
    /// silently absent from the result
    async fn products_by_id(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;

    /// Products matching any attribute in the filter, minus the excluded ids
    ///
    /// Results are ordered by ascending product id so truncation is
    /// deterministic for identical inputs.
    async fn products_matching(
        &self,
        filter: &AttributeFilter,
        excluding: &HashSet<Uuid>,
        limit: usize,
    ) -> AppResult<Vec<Product>>;

    /// The newest products by creation time, newest first
    async fn latest_products(&self, limit: usize) -> AppResult<Vec<Product>>;
}

/// Attribute query shape for [`ProductStore::products_matching`]
///
/// A product matches when its category, sub-category, or any of its tags
/// appears in the corresponding set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeFilter {
    pub categories: HashSet<String>,
    pub sub_categories: HashSet<String>,
    pub tags: HashSet<String>,
}

impl AttributeFilter {
    /// Collects the union of categories, sub-categories, and tags across the
    /// given products
    pub fn from_products(products: &[Product]) -> Self {
        let mut filter = Self::default();
        for product in products {
            filter.categories.insert(product.category.clone());
            if let Some(sub) = &product.sub_category {
                filter.sub_categories.insert(sub.clone());
            }
            for tag in &product.tags {
                filter.tags.insert(tag.clone());
            }
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.sub_categories.is_empty() && self.tags.is_empty()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if self.categories.contains(&product.category) {
            return true;
        }
        if let Some(sub) = &product.sub_category {
            if self.sub_categories.contains(sub) {
                return true;
            }
        }
        product.tags.iter().any(|tag| self.tags.contains(tag))
    }
}
