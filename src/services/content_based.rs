use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::ScoredProduct,
    stores::{AttributeFilter, ProductStore},
};

/// Every content-based candidate gets the same base score: attribute overlap
/// is a presence signal, not graded by degree. Relative strength against the
/// co-purchase signal is applied later by the blender's weights.
const BASE_SCORE: f64 = 1.0;

/// Scores catalog products by shared attributes with the recent purchases
///
/// Resolves the recent-product set to full records, collects the union of
/// their categories, sub-categories, and tags, and returns every other
/// product matching at least one of those attributes. Products in the recent
/// set or the exclusion set never appear as candidates.
pub async fn content_based(
    products: &dyn ProductStore,
    recent: &[Uuid],
    exclude: &HashSet<Uuid>,
    limit: usize,
) -> AppResult<Vec<ScoredProduct>> {
    if recent.is_empty() {
        return Ok(Vec::new());
    }

    let recent_products = products.products_by_id(recent).await?;
    let filter = AttributeFilter::from_products(&recent_products);
    if filter.is_empty() {
        // Nothing resolved (stale ids), so there is no attribute signal
        return Ok(Vec::new());
    }

    let mut excluding: HashSet<Uuid> = recent.iter().copied().collect();
    excluding.extend(exclude);

    let matches = products.products_matching(&filter, &excluding, limit).await?;

    tracing::debug!(
        recent = recent.len(),
        candidates = matches.len(),
        "Content-based candidates collected"
    );

    Ok(matches
        .into_iter()
        .map(|product| ScoredProduct {
            product,
            score: BASE_SCORE,
        })
        .collect())
}
