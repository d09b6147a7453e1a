use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product
///
/// Immutable from the recommender's perspective: products are owned by the
/// catalog service and only ever read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Top-level category, e.g. "Pottery"
    pub category: String,
    /// Optional finer-grained grouping, e.g. "Planters"
    pub sub_category: Option<String>,
    /// Free-form descriptive tags, e.g. ["clay", "handmade", "home"]
    #[serde(default)]
    pub tags: Vec<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

/// One line of an order: a product reference with quantity and the price
/// captured at purchase time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    /// Denormalized product name as it appeared when the order was placed
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
}

/// A shopper's order with its lines in purchase order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub shopper_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

/// A candidate product paired with a signal score, keyed by product identity
/// for merging
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f64,
}

/// One element of the ranked result returned to the caller
///
/// Personalized recommendations carry the blended score; fallback listings
/// carry `None` since their scores are undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub product: Product,
    pub score: Option<f64>,
}

impl Recommendation {
    pub fn scored(candidate: ScoredProduct) -> Self {
        Self {
            product: candidate.product,
            score: Some(candidate.score),
        }
    }

    pub fn unscored(product: Product) -> Self {
        Self {
            product,
            score: None,
        }
    }
}
