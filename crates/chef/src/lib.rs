pub mod error;
pub mod fake;
pub mod format;
pub mod json;
pub mod llm;
pub mod prompt;
pub mod schema;

pub use error::ChefError;
pub use fake::ScriptedModel;
pub use format::{format_error, format_markdown};
pub use json::extract_json;
pub use llm::{ChatMessage, GenerationOptions, LanguageModel, LlmError, OllamaClient};
pub use schema::{Recipe, RecipeError};

use pantry::PantryRequest;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedRecipe {
    pub recipe: Recipe,
    pub markdown: String,
    pub raw_response: String,
    pub model: String,
}

/// Turns pantry requests into recipes using a language model
#[derive(Clone)]
pub struct Chef {
    model: Arc<dyn LanguageModel>,
    repair_attempts: usize,
}

impl Chef {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            repair_attempts: 1,
        }
    }

    /// How many times an unparseable reply is sent back to the model for fixing
    pub fn with_repair_attempts(mut self, repair_attempts: usize) -> Self {
        self.repair_attempts = repair_attempts;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Run the whole pipeline for one request
    pub async fn generate(&self, request: &PantryRequest) -> Result<GeneratedRecipe, ChefError> {
        let messages = prompt::build_messages(request);
        debug!(
            ingredients = request.ingredients.len(),
            prompt_len = messages[1].content.len(),
            "Generating recipe"
        );

        let response = self.model.complete(&messages).await?;
        info!(response_len = response.len(), "Model responded");
        debug!(preview = format::preview(&response, 200), "Response preview");

        if response.trim().is_empty() {
            warn!("Empty response from model");
            return Err(ChefError::EmptyResponse);
        }

        let value = self.extract_with_repair(&response).await?;

        let recipe = Recipe::from_value(value).map_err(|e| match e {
            RecipeError::MissingFields(fields) => {
                warn!(missing = ?fields, "Recipe missing required fields");
                ChefError::MissingFields {
                    fields,
                    response: response.clone(),
                }
            }
            other => {
                warn!(error = %other, "Invalid recipe structure");
                ChefError::InvalidRecipe(other)
            }
        })?;

        let markdown = format_markdown(&recipe);

        Ok(GeneratedRecipe {
            recipe,
            markdown,
            raw_response: response,
            model: self.model.model_name().to_string(),
        })
    }

    async fn extract_with_repair(&self, response: &str) -> Result<serde_json::Value, ChefError> {
        if let Some(value) = extract_json(response) {
            return Ok(value);
        }

        let mut last = response.to_string();
        for attempt in 1..=self.repair_attempts {
            warn!(attempt, "Failed to extract JSON, asking model to repair it");

            let repaired = self
                .model
                .complete(&prompt::build_repair_messages(&last))
                .await?;
            if let Some(value) = extract_json(&repaired) {
                return Ok(value);
            }
            last = repaired;
        }

        warn!(preview = format::preview(response, 1000), "Failed to extract JSON");
        Err(ChefError::NoJson {
            response: response.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecipeError;
    use pantry::Preferences;

    fn request() -> PantryRequest {
        PantryRequest::parse("Chicken, Rice, Garlic", Preferences::from_fields("None", "Nuts", "Any"))
            .unwrap()
    }

    const GOOD: &str = r#"Here you go:
{
  "title": "Garlic Chicken Rice",
  "description": "One-pan comfort food.",
  "ingredients": ["2 chicken thighs", "1 cup rice", "3 cloves garlic",],
  "instructions": ["Brown the chicken", "Add rice and water", "Simmer"],
  "prep_time": 35
}"#;

    #[tokio::test]
    async fn test_generates_recipe() {
        let model = Arc::new(ScriptedModel::always(GOOD));
        let chef = Chef::new(model.clone());

        let generated = chef.generate(&request()).await.unwrap();

        assert_eq!(generated.recipe.title, "Garlic Chicken Rice");
        assert_eq!(generated.recipe.prep_time, "35");
        assert_eq!(generated.model, "scripted");
        assert!(generated.markdown.starts_with("# Garlic Chicken Rice\n"));
        assert!(generated.markdown.contains("3. Simmer\n"));

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0][1].content.contains("AVOID: Nuts"));
    }

    #[tokio::test]
    async fn test_empty_response() {
        let chef = Chef::new(Arc::new(ScriptedModel::always("   \n")));
        let err = chef.generate(&request()).await.unwrap_err();
        assert!(matches!(err, ChefError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_repair_round() {
        let model = Arc::new(
            ScriptedModel::new()
                .push_reply("I would make a lovely stew.")
                .push_reply(GOOD),
        );
        let chef = Chef::new(model.clone());

        let generated = chef.generate(&request()).await.unwrap();
        assert_eq!(generated.recipe.title, "Garlic Chicken Rice");
        // raw response is the first reply, not the repaired one
        assert_eq!(generated.raw_response, "I would make a lovely stew.");

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1][1].content.contains("I would make a lovely stew."));
    }

    #[tokio::test]
    async fn test_no_json_after_repairs() {
        let model = Arc::new(ScriptedModel::always("no recipe here"));
        let chef = Chef::new(model.clone()).with_repair_attempts(2);

        let err = chef.generate(&request()).await.unwrap_err();
        match err {
            ChefError::NoJson { response } => assert_eq!(response, "no recipe here"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_repair_disabled() {
        let model = Arc::new(ScriptedModel::always("nothing"));
        let chef = Chef::new(model.clone()).with_repair_attempts(0);

        assert!(chef.generate(&request()).await.is_err());
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let chef = Chef::new(Arc::new(ScriptedModel::always(
            r#"{"title": "Rice", "description": "Plain"}"#,
        )));

        let err = chef.generate(&request()).await.unwrap_err();
        match err {
            ChefError::MissingFields { fields, .. } => {
                assert_eq!(fields, vec!["ingredients", "instructions", "prep_time"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_field_types() {
        let chef = Chef::new(Arc::new(ScriptedModel::always(
            r#"{"title": "Rice", "description": "Plain", "ingredients": "rice",
                "instructions": ["Boil"], "prep_time": "20"}"#,
        )));

        let err = chef.generate(&request()).await.unwrap_err();
        match err {
            ChefError::InvalidRecipe(RecipeError::Malformed(_)) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let chef = Chef::new(Arc::new(ScriptedModel::new().push_failure("connection refused")));
        let err = chef.generate(&request()).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
