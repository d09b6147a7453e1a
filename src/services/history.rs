use std::collections::HashSet;

use uuid::Uuid;

use crate::{error::AppResult, stores::OrderStore};

/// Extracts the shopper's recent-product set
///
/// Takes the shopper's `max_orders` most recent orders, flattens their lines
/// most-recent-order first, deduplicates keeping the first occurrence, and
/// caps the result at `max_products`. The returned ids are therefore ordered
/// by purchase recency.
///
/// A shopper with no orders (or an id that references nobody) yields an
/// empty set; that is a normal outcome, not an error.
pub async fn recent_products(
    orders: &dyn OrderStore,
    shopper_id: Uuid,
    max_orders: usize,
    max_products: usize,
) -> AppResult<Vec<Uuid>> {
    let recent_orders = orders.orders_for_shopper(shopper_id).await?;

    let mut seen = HashSet::new();
    let mut product_ids = Vec::new();

    for order in recent_orders.iter().take(max_orders) {
        for line in &order.lines {
            if seen.insert(line.product_id) {
                product_ids.push(line.product_id);
                if product_ids.len() == max_products {
                    return Ok(product_ids);
                }
            }
        }
    }

    Ok(product_ids)
}
