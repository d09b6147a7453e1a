use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::RecommenderSettings,
    error::AppResult,
    models::Recommendation,
    services::{blend, co_purchase, content_based, fallback, history},
    stores::{OrderStore, ProductStore},
};

/// The recommendation pipeline
///
/// A pure function of (shopper, catalog, order history) at call time: extract
/// the shopper's recent purchases, score candidates through the content-based
/// and co-purchase signals concurrently, blend, and fall back to the newest
/// catalog products when no personalized signal exists. Holds no state
/// between calls and never writes to the stores.
pub struct Recommender {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    settings: RecommenderSettings,
}

impl Recommender {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            orders,
            products,
            settings,
        }
    }

    /// Produces up to `limit` ranked recommendations for the shopper
    ///
    /// Products in `exclude` (e.g. the shopper's current cart) never appear
    /// in the result. A shopper without usable history still receives the
    /// fallback listing; only infrastructure failures surface as errors.
    pub async fn recommend(
        &self,
        shopper_id: Uuid,
        limit: usize,
        exclude: &HashSet<Uuid>,
    ) -> AppResult<Vec<Recommendation>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let recent = history::recent_products(
            self.orders.as_ref(),
            shopper_id,
            self.settings.recent_order_window,
            self.settings.recent_product_cap,
        )
        .await?;

        if recent.is_empty() {
            tracing::info!(shopper_id = %shopper_id, "No purchase history, serving fallback");
            return self.fallback(exclude, limit).await;
        }

        // The two signals are independent given the same recent set; the
        // blend below is the join point
        let (content, co) = tokio::join!(
            content_based::content_based(
                self.products.as_ref(),
                &recent,
                exclude,
                self.settings.signal_candidate_cap,
            ),
            co_purchase::co_purchase(
                self.orders.as_ref(),
                self.products.as_ref(),
                &recent,
                exclude,
                self.settings.signal_candidate_cap,
            ),
        );
        let (content, co) = (content?, co?);

        let weights = blend::SignalWeights {
            content: self.settings.content_weight,
            co_purchase: self.settings.copurchase_weight,
        };
        let ranked = blend::blend(content, co, weights, limit);

        if ranked.is_empty() {
            tracing::info!(
                shopper_id = %shopper_id,
                recent = recent.len(),
                "No personalized candidates, serving fallback"
            );
            return self.fallback(exclude, limit).await;
        }

        tracing::info!(
            shopper_id = %shopper_id,
            recent = recent.len(),
            recommended = ranked.len(),
            "Personalized recommendations ready"
        );

        Ok(ranked.into_iter().map(Recommendation::scored).collect())
    }

    async fn fallback(
        &self,
        exclude: &HashSet<Uuid>,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let listing = fallback::latest_products(self.products.as_ref(), exclude, limit).await?;
        Ok(listing.into_iter().map(Recommendation::unscored).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::fixtures::{order, pid, product, sid};
    use crate::stores::{InMemoryStore, MockOrderStore, MockProductStore};

    fn recommender(store: InMemoryStore) -> Recommender {
        let store = Arc::new(store);
        Recommender::new(store.clone(), store, RecommenderSettings::default())
    }

    /// Shopper 1 bought product 1 (Pottery, tags clay/home). Product 2 shares
    /// the category only; product 3 is an unrelated category co-purchased
    /// with product 1 twice by other shoppers.
    fn scenario_store() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.add_product(product(1, "Pottery", None, &["clay", "home"]));
        store.add_product(product(2, "Pottery", None, &["decor"]));
        store.add_product(product(3, "Woodwork", None, &["spoon"]));
        store.add_order(order(1, sid(1), 5, &[pid(1)]));
        store.add_order(order(2, sid(2), 1, &[pid(1), pid(3)]));
        store.add_order(order(3, sid(3), 2, &[pid(1), pid(3)]));
        store
    }

    #[tokio::test]
    async fn test_blends_content_and_co_purchase_signals() {
        let rec = recommender(scenario_store());

        let result = rec.recommend(sid(1), 12, &HashSet::new()).await.unwrap();

        // Product 3: co-purchased twice, 2 × 0.8; product 2: attribute
        // overlap, 1 × 1.0
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].product.id, pid(3));
        assert_eq!(result[0].score, Some(1.6));
        assert_eq!(result[1].product.id, pid(2));
        assert_eq!(result[1].score, Some(1.0));
    }

    #[tokio::test]
    async fn test_never_recommends_an_owned_product() {
        let rec = recommender(scenario_store());

        let result = rec.recommend(sid(1), 12, &HashSet::new()).await.unwrap();

        assert!(result.iter().all(|r| r.product.id != pid(1)));
    }

    #[tokio::test]
    async fn test_is_deterministic_for_fixed_store_contents() {
        let rec = recommender(scenario_store());

        let first = rec.recommend(sid(1), 12, &HashSet::new()).await.unwrap();
        let second = rec.recommend(sid(1), 12, &HashSet::new()).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_excluding_the_top_product_promotes_the_next() {
        let rec = recommender(scenario_store());
        let exclude: HashSet<Uuid> = [pid(3)].into_iter().collect();

        let result = rec.recommend(sid(1), 5, &exclude).await.unwrap();

        // Product 3 would rank first; with it excluded product 2 takes its
        // place and the result still holds every remaining candidate
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].product.id, pid(2));
    }

    #[tokio::test]
    async fn test_product_in_both_signals_scores_strictly_higher() {
        let mut store = InMemoryStore::new();
        store.add_product(product(1, "Pottery", None, &[]));
        // Product 2 shares the category AND was co-purchased once
        store.add_product(product(2, "Pottery", None, &[]));
        store.add_order(order(1, sid(1), 5, &[pid(1)]));
        store.add_order(order(2, sid(2), 1, &[pid(1), pid(2)]));
        let rec = recommender(store);

        let result = rec.recommend(sid(1), 12, &HashSet::new()).await.unwrap();

        // 1.0 × content weight + 1 × co-purchase weight
        assert_eq!(result[0].score, Some(1.8));
    }

    #[tokio::test]
    async fn test_new_shopper_receives_newest_products() {
        let mut store = InMemoryStore::new();
        for i in 1..=20 {
            store.add_product(product(i, "Pottery", None, &[]));
        }
        let rec = recommender(store);

        let result = rec.recommend(sid(7), 8, &HashSet::new()).await.unwrap();

        assert_eq!(result.len(), 8);
        // Newest first, and no scores on the generic listing
        assert_eq!(result[0].product.id, pid(20));
        assert_eq!(result[7].product.id, pid(13));
        assert!(result.iter().all(|r| r.score.is_none()));
    }

    #[tokio::test]
    async fn test_falls_back_when_purchases_match_nothing() {
        let mut store = InMemoryStore::new();
        // Product 1 shares no attributes with the rest and was never
        // co-purchased with anything
        store.add_product(product(1, "Glasswork", None, &["vase"]));
        for i in 2..=7 {
            store.add_product(product(i, "Pottery", None, &["clay"]));
        }
        store.add_order(order(1, sid(1), 1, &[pid(1)]));
        let rec = recommender(store);

        let result = rec.recommend(sid(1), 5, &HashSet::new()).await.unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(result[0].product.id, pid(7));
        assert!(result.iter().all(|r| r.score.is_none()));
    }

    #[tokio::test]
    async fn test_zero_limit_returns_empty_without_store_access() {
        // The mocks have no expectations: any store call would panic
        let rec = Recommender::new(
            Arc::new(MockOrderStore::new()),
            Arc::new(MockProductStore::new()),
            RecommenderSettings::default(),
        );

        let result = rec.recommend(sid(1), 0, &HashSet::new()).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_result_never_exceeds_limit() {
        let mut store = InMemoryStore::new();
        for i in 1..=10 {
            store.add_product(product(i, "Pottery", None, &[]));
        }
        store.add_order(order(1, sid(1), 1, &[pid(1)]));
        let rec = recommender(store);

        let result = rec.recommend(sid(1), 3, &HashSet::new()).await.unwrap();

        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_catalog_yields_empty_result() {
        let rec = recommender(InMemoryStore::new());
        let result = rec.recommend(sid(1), 12, &HashSet::new()).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut orders = MockOrderStore::new();
        orders
            .expect_orders_for_shopper()
            .returning(|_| Err(AppError::Internal("connection refused".to_string())));
        let rec = Recommender::new(
            Arc::new(orders),
            Arc::new(MockProductStore::new()),
            RecommenderSettings::default(),
        );

        let result = rec.recommend(sid(1), 12, &HashSet::new()).await;

        assert!(result.is_err());
    }
}
