use std::collections::HashSet;

use uuid::Uuid;

use crate::{error::AppResult, models::Product, stores::ProductStore};

/// Recency-ordered catalog listing for shoppers with no personalized signal
///
/// Over-fetches by the size of the exclusion set before filtering, so caller
/// exclusions (items already in the cart) never shorten the result below
/// `min(limit, catalog size)`. Returns empty only when the catalog itself
/// is empty.
pub async fn latest_products(
    products: &dyn ProductStore,
    exclude: &HashSet<Uuid>,
    limit: usize,
) -> AppResult<Vec<Product>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut listing = products.latest_products(limit + exclude.len()).await?;
    listing.retain(|p| !exclude.contains(&p.id));
    listing.truncate(limit);

    tracing::debug!(count = listing.len(), "Serving fallback listing");

    Ok(listing)
}
