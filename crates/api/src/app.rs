use axum::{
    Router,
    routing::{get, post},
};
use chef::{Chef, ChefError, GeneratedRecipe, LanguageModel};
use pantry::PantryRequest;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::cache::RecipeCache;
use crate::config::AppConfig;
use crate::history::HistoryStore;
use crate::metrics::{Metrics, TimedOperation};
use crate::profile::ProfileStore;
use crate::retry::RetryPolicy;
use crate::{handlers, web};

pub struct AppState {
    pub chef: Chef,
    pub retry: RetryPolicy,
    pub cache: Option<RecipeCache>,
    pub history: HistoryStore,
    pub profile: ProfileStore,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: &AppConfig, model: Arc<dyn LanguageModel>) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| RecipeCache::new(config.cache.max_entries));

        Self {
            chef: Chef::new(model).with_repair_attempts(config.llm.repair_attempts),
            retry: RetryPolicy::from_config(&config.retry),
            cache,
            history: HistoryStore::new(config.history.max_entries),
            profile: ProfileStore::new(),
            metrics: Metrics::new(),
        }
    }

    /// Generate a recipe, going through the cache and retry policy
    pub async fn generate(&self, request: &PantryRequest) -> Result<GeneratedRecipe, ChefError> {
        if let Some(hit) = self.cache.as_ref().and_then(|cache| cache.get(request)) {
            info!(title = %hit.recipe.title, "Serving cached recipe");
            self.metrics.record_cache_hit();
            self.metrics.record_request(true);
            return Ok(hit);
        }

        let timer = TimedOperation::start();
        let result = self
            .retry
            .retry(
                "generate_recipe",
                || self.chef.generate(request),
                ChefError::is_retryable,
            )
            .await;
        self.metrics.record_generation(timer.elapsed());
        self.metrics.record_request(result.is_ok());

        if let (Ok(generated), Some(cache)) = (&result, &self.cache) {
            cache.insert(request, generated.clone());
        }

        result
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(web::index))
        .route("/generate", post(web::generate))
        .route("/api/generate-recipe", post(handlers::generate_recipe))
        .route("/api/recipes", get(handlers::list_recipes))
        .route("/api/recipes/:id", get(handlers::get_recipe))
        .route("/api/recipes/:id/rating", post(handlers::rate_recipe))
        .route(
            "/api/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
