use std::collections::HashMap;

use uuid::Uuid;

use crate::models::ScoredProduct;

/// Fixed per-signal weights applied when merging candidate sets
#[derive(Debug, Clone, Copy)]
pub struct SignalWeights {
    pub content: f64,
    pub co_purchase: f64,
}

/// Merges the two scored candidate sets into a single ranked result
///
/// Scores accumulate additively: a product surfaced by both signals receives
/// both weighted contributions. The result is sorted by descending blended
/// score with ties broken by ascending product id, then truncated to `limit`.
/// Two empty inputs blend to an empty result; the caller decides whether to
/// fall back.
pub fn blend(
    content: Vec<ScoredProduct>,
    co_purchase: Vec<ScoredProduct>,
    weights: SignalWeights,
    limit: usize,
) -> Vec<ScoredProduct> {
    let mut accumulated: HashMap<Uuid, ScoredProduct> = HashMap::new();

    for candidate in content {
        let weighted = candidate.score * weights.content;
        accumulate(&mut accumulated, candidate, weighted);
    }
    for candidate in co_purchase {
        let weighted = candidate.score * weights.co_purchase;
        accumulate(&mut accumulated, candidate, weighted);
    }

    let mut ranked: Vec<ScoredProduct> = accumulated.into_values().collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.product.id.cmp(&b.product.id))
    });
    ranked.truncate(limit);
    ranked
}

fn accumulate(
    accumulated: &mut HashMap<Uuid, ScoredProduct>,
    candidate: ScoredProduct,
    weighted: f64,
) {
    accumulated
        .entry(candidate.product.id)
        .and_modify(|existing| existing.score += weighted)
        .or_insert(ScoredProduct {
            product: candidate.product,
            score: weighted,
        });
}
