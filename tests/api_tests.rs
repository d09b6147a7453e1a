use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use artisan_api::api::{create_router, AppState};
use artisan_api::config::RecommenderSettings;
use artisan_api::models::{Order, OrderLine, Product};
use artisan_api::stores::InMemoryStore;

fn pid(n: u32) -> Uuid {
    Uuid::from_u128(n as u128)
}

fn sid(n: u32) -> Uuid {
    Uuid::from_u128(0x1000_0000_0000_0000_0000_0000_0000_0000 + n as u128)
}

fn product(n: u32, category: &str, tags: &[&str]) -> Product {
    Product {
        id: pid(n),
        name: format!("Product {}", n),
        category: category.to_string(),
        sub_category: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        price: 100.0 + n as f64,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::days(n as i64),
    }
}

fn order(n: u32, shopper: Uuid, day: u32, product_ids: &[Uuid]) -> Order {
    Order {
        id: Uuid::from_u128(0x2000_0000_0000_0000_0000_0000_0000_0000 + n as u128),
        shopper_id: shopper,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
            + Duration::days(day as i64),
        lines: product_ids
            .iter()
            .map(|id| OrderLine {
                product_id: *id,
                name: "line".to_string(),
                quantity: 1,
                unit_price: 50.0,
            })
            .collect(),
    }
}

fn create_test_server(store: InMemoryStore) -> TestServer {
    let store = Arc::new(store);
    let state = AppState::new(
        store.clone(),
        store,
        RecommenderSettings::default(),
        12,
    );
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

/// Shopper 1 bought product 1; product 2 shares its category, product 3 is
/// unrelated but co-purchased with product 1 twice by other shoppers.
fn seeded_store() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    store.add_product(product(1, "Pottery", &["clay", "home"]));
    store.add_product(product(2, "Pottery", &["decor"]));
    store.add_product(product(3, "Woodwork", &["spoon"]));
    store.add_order(order(1, sid(1), 5, &[pid(1)]));
    store.add_order(order(2, sid(2), 1, &[pid(1), pid(3)]));
    store.add_order(order(3, sid(3), 2, &[pid(1), pid(3)]));
    store
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(InMemoryStore::new());
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_personalized_recommendations() {
    let server = create_test_server(seeded_store());

    let response = server
        .get(&format!("/api/v1/shoppers/{}/recommendations", sid(1)))
        .await;
    response.assert_status_ok();

    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 2);

    // Co-purchase (2 × 0.8) outranks attribute overlap (1 × 1.0)
    assert_eq!(recs[0]["id"], pid(3).to_string());
    assert_eq!(recs[0]["score"], 1.6);
    assert_eq!(recs[1]["id"], pid(2).to_string());
    assert_eq!(recs[1]["score"], 1.0);

    // The purchased product never recommends itself
    assert!(recs.iter().all(|r| r["id"] != pid(1).to_string()));
}

#[tokio::test]
async fn test_new_shopper_gets_newest_products_without_scores() {
    let mut store = InMemoryStore::new();
    for i in 1..=20 {
        store.add_product(product(i, "Pottery", &[]));
    }
    let server = create_test_server(store);

    let response = server
        .get(&format!(
            "/api/v1/shoppers/{}/recommendations?limit=8",
            sid(9)
        ))
        .await;
    response.assert_status_ok();

    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 8);
    assert_eq!(recs[0]["id"], pid(20).to_string());
    assert_eq!(recs[7]["id"], pid(13).to_string());
    // Fallback listings carry no score field at all
    assert!(recs.iter().all(|r| r.get("score").is_none()));
}

#[tokio::test]
async fn test_exclude_param_omits_the_top_product() {
    let server = create_test_server(seeded_store());

    let response = server
        .get(&format!(
            "/api/v1/shoppers/{}/recommendations?exclude={}",
            sid(1),
            pid(3)
        ))
        .await;
    response.assert_status_ok();

    let recs: Vec<serde_json::Value> = response.json();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["id"], pid(2).to_string());
}

#[tokio::test]
async fn test_zero_limit_yields_empty_result() {
    let server = create_test_server(seeded_store());

    let response = server
        .get(&format!(
            "/api/v1/shoppers/{}/recommendations?limit=0",
            sid(1)
        ))
        .await;
    response.assert_status_ok();

    let recs: Vec<serde_json::Value> = response.json();
    assert!(recs.is_empty());
}

#[tokio::test]
async fn test_malformed_exclude_id_is_rejected() {
    let server = create_test_server(seeded_store());

    let response = server
        .get(&format!(
            "/api/v1/shoppers/{}/recommendations?exclude=not-a-uuid",
            sid(1)
        ))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_shopper_id_is_rejected() {
    let server = create_test_server(seeded_store());

    let response = server
        .get("/api/v1/shoppers/not-a-uuid/recommendations")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_catalog_yields_empty_result() {
    let server = create_test_server(InMemoryStore::new());

    let response = server
        .get(&format!("/api/v1/shoppers/{}/recommendations", sid(1)))
        .await;
    response.assert_status_ok();

    let recs: Vec<serde_json::Value> = response.json();
    assert!(recs.is_empty());
}
