use thiserror::Error;

use crate::llm::LlmError;
use crate::schema::RecipeError;

#[derive(Debug, Error)]
pub enum ChefError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("language model returned an empty response")]
    EmptyResponse,

    #[error("no recipe JSON found in the model response")]
    NoJson { response: String },

    #[error("generated recipe missing required fields: {}", .fields.join(", "))]
    MissingFields {
        fields: Vec<&'static str>,
        response: String,
    },

    #[error("generated recipe is invalid: {0}")]
    InvalidRecipe(RecipeError),
}

impl ChefError {
    /// Model output is sampled, so a fresh attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ChefError::Model(LlmError::Api { status, .. }) => *status >= 500 || *status == 429,
            _ => true,
        }
    }

    /// True when the model server could not be reached or refused the call.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ChefError::Model(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(ChefError::EmptyResponse.is_retryable());
        assert!(ChefError::Model(LlmError::Request("refused".into())).is_retryable());
        assert!(
            ChefError::Model(LlmError::Api {
                status: 503,
                message: "busy".into()
            })
            .is_retryable()
        );
        assert!(
            !ChefError::Model(LlmError::Api {
                status: 400,
                message: "bad model".into()
            })
            .is_retryable()
        );
    }

    #[test]
    fn test_missing_fields_message() {
        let err = ChefError::MissingFields {
            fields: vec!["title", "prep_time"],
            response: String::new(),
        };
        assert_eq!(err.to_string(), "generated recipe missing required fields: title, prep_time");
    }
}
