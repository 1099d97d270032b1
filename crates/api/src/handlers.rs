use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use pantry::{PantryRequest, Preferences};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::history::{MAX_RATING, MIN_RATING, SavedRecipe, valid_rating};
use crate::metrics::MetricsSnapshot;
use crate::profile::{Profile, ProfileUpdate};

#[derive(Deserialize)]
pub struct GenerateRecipeRequest {
    ingredients: Vec<String>,
    #[serde(default)]
    dietary_prefs: Vec<String>,
    #[serde(default)]
    allergies: Vec<String>,
    #[serde(default)]
    favorite_cuisines: Vec<String>,
}

#[derive(Deserialize)]
pub struct RatingRequest {
    rating: i64,
}

#[derive(Deserialize)]
pub struct ListQuery {
    q: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    model: String,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    requests: MetricsSnapshot,
    cached_recipes: usize,
    saved_recipes: usize,
}

pub async fn generate_recipe(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRecipeRequest>, JsonRejection>,
) -> Result<Json<SavedRecipe>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        state.metrics.record_rejected();
        ApiError::BadRequest(format!("Invalid request: {}", e.body_text()))
    })?;

    let mut preferences =
        Preferences::from_lists(&req.dietary_prefs, &req.allergies, &req.favorite_cuisines);
    if preferences.is_unconstrained() {
        preferences = state.profile.preferences().await;
    }
    let request = PantryRequest::from_list(&req.ingredients, preferences).map_err(|e| {
        state.metrics.record_rejected();
        ApiError::from(e)
    })?;

    let generated = state.generate(&request).await?;

    let saved = state.history.save(
        request.ingredients,
        request.preferences,
        generated.recipe,
        generated.model,
    );
    info!(id = %saved.id, title = %saved.recipe_json.title, "Recipe saved");

    Ok(Json(saved))
}

pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<SavedRecipe>> {
    match query.q {
        Some(q) => Json(state.history.search(&q)),
        None => Json(state.history.list()),
    }
}

pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SavedRecipe>, ApiError> {
    state
        .history
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} not found", id)))
}

pub async fn rate_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> Result<Json<SavedRecipe>, ApiError> {
    let Json(req) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request: {}", e.body_text())))?;

    let rating = u8::try_from(req.rating)
        .ok()
        .filter(|r| valid_rating(*r))
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            ))
        })?;

    let rated = state
        .history
        .rate(&id, rating)
        .ok_or_else(|| ApiError::NotFound(format!("Recipe {} not found", id)))?;
    info!(id = %id, rating, "Recipe rated");

    Ok(Json(rated))
}

pub async fn get_profile(State(state): State<Arc<AppState>>) -> Json<Profile> {
    Json(state.profile.get().await)
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Json(update) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request: {}", e.body_text())))?;

    let profile = state.profile.update(update).await;
    info!(name = ?profile.name, "Profile updated");

    Ok(Json(profile))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.chef.model_name().to_string(),
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        requests: state.metrics.snapshot(),
        cached_recipes: state.cache.as_ref().map_or(0, |cache| cache.len()),
        saved_recipes: state.history.len(),
    })
}
