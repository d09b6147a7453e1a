use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::ScoredProduct,
    stores::{OrderStore, ProductStore},
};

/// Scores catalog products by how often they were bought together with the
/// recent purchases
///
/// Counting is order-level: each qualifying order contributes at most 1 to a
/// co-occurring product's counter, no matter how many lines or what quantity
/// reference it. The raw counter is the candidate's score; the blender
/// weights it against the content-based signal.
pub async fn co_purchase(
    orders: &dyn OrderStore,
    products: &dyn ProductStore,
    recent: &[Uuid],
    exclude: &HashSet<Uuid>,
    limit: usize,
) -> AppResult<Vec<ScoredProduct>> {
    if recent.is_empty() {
        return Ok(Vec::new());
    }

    let recent_set: HashSet<Uuid> = recent.iter().copied().collect();
    let co_orders = orders.orders_containing_any_of(recent).await?;

    let mut counts: HashMap<Uuid, u32> = HashMap::new();
    for order in &co_orders {
        let distinct: HashSet<Uuid> = order.lines.iter().map(|l| l.product_id).collect();
        for product_id in distinct {
            if recent_set.contains(&product_id) || exclude.contains(&product_id) {
                continue;
            }
            *counts.entry(product_id).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(Uuid, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);

    let candidate_ids: Vec<Uuid> = ranked.iter().map(|(id, _)| *id).collect();
    let records = products.products_by_id(&candidate_ids).await?;
    let mut by_id: HashMap<Uuid, _> = records.into_iter().map(|p| (p.id, p)).collect();

    tracing::debug!(
        co_orders = co_orders.len(),
        candidates = ranked.len(),
        "Co-purchase candidates collected"
    );

    // Ids without a backing product (deleted from the catalog) are dropped
    let mut candidates = Vec::with_capacity(ranked.len());
    for (id, count) in ranked {
        if let Some(product) = by_id.remove(&id) {
            candidates.push(ScoredProduct {
                product,
                score: count as f64,
            });
        }
    }

    Ok(candidates)
}
