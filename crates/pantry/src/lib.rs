pub mod ingredients;
pub mod preferences;

pub use ingredients::parse_ingredients;
pub use preferences::Preferences;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PantryError {
    #[error("Please provide at least one ingredient.")]
    EmptyIngredients,

    #[error("Please provide valid ingredients separated by commas.")]
    NoValidIngredients,
}

/// A validated request for one recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryRequest {
    pub ingredients: Vec<String>,
    pub preferences: Preferences,
}

impl PantryRequest {
    /// Parse the raw comma-separated ingredient text.
    pub fn parse(raw_ingredients: &str, preferences: Preferences) -> Result<Self, PantryError> {
        if raw_ingredients.trim().is_empty() {
            return Err(PantryError::EmptyIngredients);
        }

        let ingredients = parse_ingredients(raw_ingredients);
        if ingredients.is_empty() {
            return Err(PantryError::NoValidIngredients);
        }

        Ok(Self {
            ingredients,
            preferences,
        })
    }

    /// Build from an already-split list, as the JSON API sends it
    pub fn from_list(items: &[String], preferences: Preferences) -> Result<Self, PantryError> {
        Self::parse(&items.join(", "), preferences)
    }

    pub fn ingredient_line(&self) -> String {
        self.ingredients.join(", ")
    }

    /// Stable hash of the request, case-insensitive on ingredient names.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for ingredient in &self.ingredients {
            hasher.update(ingredient.to_lowercase().as_bytes());
            hasher.update([0u8]);
        }
        for field in [
            &self.preferences.dietary,
            &self.preferences.allergies,
            &self.preferences.cuisines,
        ] {
            hasher.update([1u8]);
            if let Some(value) = field {
                hasher.update(value.to_lowercase().as_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }
}
