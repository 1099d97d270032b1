use chef::Recipe;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pantry::Preferences;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub id: Uuid,
    pub ingredients_used: Vec<String>,
    pub preferences: Preferences,
    pub recipe_json: Recipe,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub rating: Option<u8>,
}

impl SavedRecipe {
    fn matches(&self, lowered_query: &str) -> bool {
        let recipe = &self.recipe_json;
        std::iter::once(&recipe.title)
            .chain(&self.ingredients_used)
            .chain(&recipe.ingredients)
            .chain(&recipe.instructions)
            .any(|text| text.to_lowercase().contains(lowered_query))
    }
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// In-memory store of generated recipes, oldest evicted first.
pub struct HistoryStore {
    recipes: DashMap<Uuid, SavedRecipe>,
    max_entries: usize,
}

impl HistoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            recipes: DashMap::new(),
            max_entries,
        }
    }

    pub fn save(
        &self,
        ingredients_used: Vec<String>,
        preferences: Preferences,
        recipe: Recipe,
        model: String,
    ) -> SavedRecipe {
        let saved = SavedRecipe {
            id: Uuid::new_v4(),
            ingredients_used,
            preferences,
            recipe_json: recipe,
            model,
            created_at: Utc::now(),
            rating: None,
        };

        self.recipes.insert(saved.id, saved.clone());
        self.evict_oldest();

        saved
    }

    pub fn get(&self, id: &Uuid) -> Option<SavedRecipe> {
        self.recipes.get(id).map(|r| r.value().clone())
    }

    /// Newest first
    pub fn list(&self) -> Vec<SavedRecipe> {
        let mut all: Vec<SavedRecipe> = self.recipes.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Case-insensitive match over title, ingredients and instructions, newest first.
    /// A blank query returns everything.
    pub fn search(&self, query: &str) -> Vec<SavedRecipe> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.list();
        }

        self.list()
            .into_iter()
            .filter(|saved| saved.matches(&query))
            .collect()
    }

    /// Returns the updated record, or `None` for an unknown id.
    pub fn rate(&self, id: &Uuid, rating: u8) -> Option<SavedRecipe> {
        let mut entry = self.recipes.get_mut(id)?;
        entry.rating = Some(rating);
        Some(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    fn evict_oldest(&self) {
        while self.recipes.len() > self.max_entries {
            let oldest = self
                .recipes
                .iter()
                .min_by_key(|r| r.value().created_at)
                .map(|r| *r.key());
            match oldest {
                Some(id) => {
                    self.recipes.remove(&id);
                }
                None => break,
            }
        }
    }
}

pub fn valid_rating(rating: u8) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}
