use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const REQUIRED_FIELDS: [&str; 5] = [
    "title",
    "description",
    "ingredients",
    "instructions",
    "prep_time",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "text_items")]
    pub ingredients: Vec<String>,
    #[serde(deserialize_with = "text_items")]
    pub instructions: Vec<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub prep_time: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecipeError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("recipe has the wrong shape: {0}")]
    Malformed(String),

    #[error("recipe field `{0}` is empty")]
    Empty(&'static str),
}

/// Required fields absent from a decoded object, in declaration order
pub fn missing_fields(value: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| value.get(field).is_none())
        .collect()
}

impl Recipe {
    pub fn from_value(value: Value) -> Result<Self, RecipeError> {
        let missing = missing_fields(&value);
        if !missing.is_empty() {
            return Err(RecipeError::MissingFields(missing));
        }

        let recipe: Recipe =
            serde_json::from_value(value).map_err(|e| RecipeError::Malformed(e.to_string()))?;
        recipe.validate()?;
        Ok(recipe)
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.title.trim().is_empty() {
            return Err(RecipeError::Empty("title"));
        }
        if self.description.trim().is_empty() {
            return Err(RecipeError::Empty("description"));
        }
        if self.ingredients.is_empty() {
            return Err(RecipeError::Empty("ingredients"));
        }
        if self.instructions.is_empty() {
            return Err(RecipeError::Empty("instructions"));
        }
        Ok(())
    }
}

// Models often answer `"prep_time": 30` despite the template
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}

// Lists must be arrays, but items such as `{"item": "rice", "amount": "1 cup"}`
// are kept as their compact JSON text
fn text_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<Value>::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect())
}
