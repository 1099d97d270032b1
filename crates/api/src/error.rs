use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chef::ChefError;
use pantry::PantryError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<PantryError> for ApiError {
    fn from(err: PantryError) -> Self {
        ApiError::BadRequest(format!("Invalid ingredients: {}", err))
    }
}

impl From<ChefError> for ApiError {
    fn from(err: ChefError) -> Self {
        if err.is_unavailable() {
            return ApiError::Unavailable(
                "Failed to generate recipe. The service may be temporarily unavailable. Please try again."
                    .to_string(),
            );
        }

        match err {
            ChefError::MissingFields { .. } | ChefError::InvalidRecipe(_) => ApiError::Internal(
                "AI generated invalid recipe format. Please try again.".to_string(),
            ),
            _ => ApiError::Internal(
                "Failed to parse recipe from AI response. Please try again.".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chef::LlmError;

    #[test]
    fn test_chef_error_statuses() {
        let unavailable = ApiError::from(ChefError::Model(LlmError::Request("refused".into())));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);

        let unparsed = ApiError::from(ChefError::NoJson {
            response: "nope".into(),
        });
        assert_eq!(unparsed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(unparsed.to_string().starts_with("Failed to parse recipe"));
    }

    #[test]
    fn test_pantry_error_is_bad_request() {
        let err = ApiError::from(PantryError::EmptyIngredients);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Invalid ingredients: Please provide at least one ingredient."
        );
    }
}
