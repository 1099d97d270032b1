use chef::GeneratedRecipe;
use dashmap::DashMap;
use pantry::PantryRequest;
use std::sync::Arc;

/// Generated recipes keyed by request fingerprint
pub struct RecipeCache {
    recipes: Arc<DashMap<String, GeneratedRecipe>>,
    max_entries: usize,
}

impl RecipeCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            recipes: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn get(&self, request: &PantryRequest) -> Option<GeneratedRecipe> {
        self.recipes
            .get(&request.fingerprint())
            .map(|r| r.value().clone())
    }

    pub fn insert(&self, request: &PantryRequest, recipe: GeneratedRecipe) {
        if self.max_entries == 0 {
            return;
        }
        if self.recipes.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self
                .recipes
                .iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.recipes.remove(&key);
            }
        }
        self.recipes.insert(request.fingerprint(), recipe);
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }
}
