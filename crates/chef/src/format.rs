use std::fmt::Write;

use crate::error::ChefError;
use crate::schema::Recipe;

pub const ERROR_MARK: &str = "❌";

/// Render a recipe as Markdown followed by its pretty-printed JSON
pub fn format_markdown(recipe: &Recipe) -> String {
    let mut output = format!(
        "# {}\n\n**{}**\n\n⏱️ **Prep Time:** {}\n\n## Ingredients\n",
        recipe.title, recipe.description, recipe.prep_time
    );

    for ingredient in &recipe.ingredients {
        let _ = writeln!(output, "- {}", ingredient);
    }

    output.push_str("\n## Instructions\n");
    for (i, instruction) in recipe.instructions.iter().enumerate() {
        let _ = writeln!(output, "{}. {}", i + 1, instruction);
    }

    // Serializing a struct of strings cannot fail
    let json = serde_json::to_string_pretty(recipe).unwrap_or_default();
    let _ = write!(output, "\n---\n\n**JSON Output:**\n```json\n{}\n```", json);

    output
}

/// User-facing text for a failed generation.
pub fn format_error(err: &ChefError) -> String {
    match err {
        ChefError::Model(e) => format!("{ERROR_MARK} Error during generation: {e}"),
        ChefError::EmptyResponse => format!("{ERROR_MARK} Empty response from model. Please try again."),
        ChefError::NoJson { response } => format!(
            "{ERROR_MARK} Failed to generate valid recipe JSON.\n\nRaw response (first 1000 chars):\n\n{}\n\nPlease try again.",
            preview(response, 1000)
        ),
        ChefError::MissingFields { fields, response } => format!(
            "{ERROR_MARK} Generated recipe missing required fields: {}\n\nResponse: {}",
            fields.join(", "),
            preview(response, 500)
        ),
        ChefError::InvalidRecipe(e) => {
            format!("{ERROR_MARK} AI generated invalid recipe format ({e}). Please try again.")
        }
    }
}

/// First `max_chars` characters of `text`
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
