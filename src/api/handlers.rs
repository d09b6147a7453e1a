use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Recommendation,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    /// Maximum number of recommendations to return
    pub limit: Option<usize>,
    /// Comma-separated product ids to force-exclude (e.g. the current cart)
    pub exclude: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub tags: Vec<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    /// Blended relevance score; absent on the generic fallback listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl From<&Recommendation> for RecommendationResponse {
    fn from(rec: &Recommendation) -> Self {
        Self {
            id: rec.product.id,
            name: rec.product.name.clone(),
            category: rec.product.category.clone(),
            sub_category: rec.product.sub_category.clone(),
            tags: rec.product.tags.clone(),
            price: rec.product.price,
            created_at: rec.product.created_at,
            score: rec.score,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Ranked product recommendations for one shopper
pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(shopper_id): Path<Uuid>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<Vec<RecommendationResponse>>> {
    let limit = params.limit.unwrap_or(state.default_limit);
    let exclude = parse_exclude(params.exclude.as_deref())?;

    let recommendations = state
        .recommender()
        .recommend(shopper_id, limit, &exclude)
        .await?;

    Ok(Json(
        recommendations
            .iter()
            .map(RecommendationResponse::from)
            .collect(),
    ))
}

/// Parses the comma-separated exclusion list, rejecting malformed ids before
/// any store access
fn parse_exclude(raw: Option<&str>) -> AppResult<HashSet<Uuid>> {
    let mut ids = HashSet::new();

    if let Some(raw) = raw {
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let id = Uuid::parse_str(part)
                .map_err(|_| AppError::InvalidInput(format!("Invalid product id: {}", part)))?;
            ids.insert(id);
        }
    }

    Ok(ids)
}
