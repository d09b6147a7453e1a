use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{Order, OrderLine, Product},
    stores::{AttributeFilter, OrderStore, ProductStore},
};

/// Postgres-backed order history
pub struct PgOrderStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    shopper_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    order_id: Uuid,
    product_id: Uuid,
    name: String,
    quantity: i32,
    unit_price: f64,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the lines for the given order rows and assembles full orders,
    /// preserving the row order of `rows`
    async fn attach_lines(&self, rows: Vec<OrderRow>) -> AppResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let line_rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT order_id, product_id, name, quantity, unit_price
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, line_no
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            lines_by_order
                .entry(row.order_id)
                .or_default()
                .push(OrderLine {
                    product_id: row.product_id,
                    name: row.name,
                    quantity: row.quantity,
                    unit_price: row.unit_price,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| Order {
                lines: lines_by_order.remove(&row.id).unwrap_or_default(),
                id: row.id,
                shopper_id: row.shopper_id,
                created_at: row.created_at,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl OrderStore for PgOrderStore {
    async fn orders_for_shopper(&self, shopper_id: Uuid) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, shopper_id, created_at
            FROM orders
            WHERE shopper_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(shopper_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    async fn orders_containing_any_of(&self, product_ids: &[Uuid]) -> AppResult<Vec<Order>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT DISTINCT o.id, o.shopper_id, o.created_at
            FROM orders o
            JOIN order_lines l ON l.order_id = o.id
            WHERE l.product_id = ANY($1)
            ORDER BY o.created_at DESC, o.id
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        self.attach_lines(rows).await
    }
}

/// Postgres-backed product catalog
///
/// The newest-products listing that serves the recommendation fallback is
/// cached in Redis with a short TTL; everything else is a direct query.
pub struct PgProductStore {
    pool: PgPool,
    cache: Cache,
    latest_ttl: u64,
}

const PRODUCT_COLUMNS: &str = "id, name, category, sub_category, tags, price, created_at";

impl PgProductStore {
    pub fn new(pool: PgPool, cache: Cache, latest_ttl: u64) -> Self {
        Self {
            pool,
            cache,
            latest_ttl,
        }
    }

    async fn fetch_latest(&self, limit: usize) -> AppResult<Vec<Product>> {
        tracing::debug!(limit, "Newest-products cache miss, querying catalog");

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            ORDER BY created_at DESC, id
            LIMIT $1
            "#,
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

#[async_trait::async_trait]
impl ProductStore for PgProductStore {
    async fn products_by_id(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE id = ANY($1)
            "#,
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn products_matching(
        &self,
        filter: &AttributeFilter,
        excluding: &HashSet<Uuid>,
        limit: usize,
    ) -> AppResult<Vec<Product>> {
        let excluded: Vec<Uuid> = excluding.iter().copied().collect();
        let categories: Vec<String> = filter.categories.iter().cloned().collect();
        let sub_categories: Vec<String> = filter.sub_categories.iter().cloned().collect();
        let tags: Vec<String> = filter.tags.iter().cloned().collect();

        // `&&` is array overlap: any shared tag qualifies the product
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE NOT (id = ANY($1))
              AND (category = ANY($2)
                OR sub_category = ANY($3)
                OR tags && $4)
            ORDER BY id
            LIMIT $5
            "#,
        ))
        .bind(&excluded)
        .bind(&categories)
        .bind(&sub_categories)
        .bind(&tags)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn latest_products(&self, limit: usize) -> AppResult<Vec<Product>> {
        let key = CacheKey::LatestProducts(limit);
        cached!(self.cache, key, self.latest_ttl, self.fetch_latest(limit))
    }
}
