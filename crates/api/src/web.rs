//! Server-rendered recipe form.

use axum::{
    Form,
    extract::{Query, State},
    response::Html,
};
use chef::format::{ERROR_MARK, format_error};
use pantry::{PantryRequest, Preferences};
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;
use tracing::info;

use crate::app::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeForm {
    #[serde(default)]
    pub ingredients: String,
    #[serde(default = "default_none")]
    pub dietary_prefs: String,
    #[serde(default = "default_none")]
    pub allergies: String,
    #[serde(default = "default_any")]
    pub favorite_cuisines: String,
}

fn default_none() -> String {
    "None".to_string()
}

fn default_any() -> String {
    "Any".to_string()
}

impl Default for RecipeForm {
    fn default() -> Self {
        Self {
            ingredients: String::new(),
            dietary_prefs: default_none(),
            allergies: default_none(),
            favorite_cuisines: default_any(),
        }
    }
}

pub enum Outcome {
    Recipe(String),
    Error(String),
}

/// Preset inputs: ingredients, dietary, allergies, cuisines
const PRESETS: [[&str; 4]; 4] = [
    ["Chicken, Rice, Tomatoes, Onions, Garlic", "None", "None", "Any"],
    ["Eggs, Flour, Milk, Butter, Sugar", "None", "Dairy", "Any"],
    ["Tofu, Broccoli, Carrots, Soy Sauce, Ginger", "Vegan", "None", "Asian"],
    ["Pasta, Olive Oil, Garlic, Basil, Tomatoes", "Vegetarian", "None", "Italian"],
];

pub async fn index(Query(form): Query<RecipeForm>) -> Html<String> {
    Html(render_page(&form, None))
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RecipeForm>,
) -> Html<String> {
    let preferences =
        Preferences::from_fields(&form.dietary_prefs, &form.allergies, &form.favorite_cuisines);

    let outcome = match PantryRequest::parse(&form.ingredients, preferences) {
        Err(e) => {
            state.metrics.record_rejected();
            Outcome::Error(format!("{} {}", ERROR_MARK, e))
        }
        Ok(request) => match state.generate(&request).await {
            Ok(generated) => {
                let markdown = generated.markdown;
                let saved = state.history.save(
                    request.ingredients,
                    request.preferences,
                    generated.recipe,
                    generated.model,
                );
                info!(id = %saved.id, "Recipe generated from form");
                Outcome::Recipe(markdown)
            }
            Err(e) => Outcome::Error(format_error(&e)),
        },
    };

    Html(render_page(&form, Some(&outcome)))
}

pub fn render_page(form: &RecipeForm, outcome: Option<&Outcome>) -> String {
    let mut page = String::from(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>PantryChef - AI Recipe Generator</title>
<style>
body { font-family: sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
label { display: block; margin-top: 0.75rem; font-weight: bold; }
input, textarea { width: 100%; padding: 0.4rem; }
button { margin-top: 1rem; padding: 0.6rem 1.2rem; }
pre { white-space: pre-wrap; background: #f6f6f6; padding: 1rem; }
.presets form { display: inline; }
.error { border-left: 4px solid #c33; }
</style>
</head>
<body>
<h1>🥘 PantryChef - AI Recipe Generator</h1>
<p>Generate delicious recipes from the ingredients you have in your pantry!</p>
"#,
    );

    let _ = write!(
        page,
        r#"<form method="post" action="/generate">
<label for="ingredients">Available Ingredients</label>
<textarea id="ingredients" name="ingredients" rows="3" placeholder="e.g., Chicken, Rice, Tomatoes, Onions, Garlic">{}</textarea>
<label for="dietary_prefs">Dietary Preferences</label>
<input id="dietary_prefs" name="dietary_prefs" placeholder="e.g., Vegetarian, Vegan, Keto" value="{}">
<label for="allergies">Allergies (MUST AVOID)</label>
<input id="allergies" name="allergies" placeholder="e.g., Nuts, Shellfish, Dairy" value="{}">
<label for="favorite_cuisines">Favorite Cuisines</label>
<input id="favorite_cuisines" name="favorite_cuisines" placeholder="e.g., Italian, Asian, Mexican" value="{}">
<button type="submit">Generate Recipe 🍳</button>
</form>
"#,
        html_escape(&form.ingredients),
        html_escape(&form.dietary_prefs),
        html_escape(&form.allergies),
        html_escape(&form.favorite_cuisines),
    );

    page.push_str("<h2>Examples</h2>\n<div class=\"presets\">\n");
    for [ingredients, dietary, allergies, cuisines] in PRESETS {
        let _ = writeln!(
            page,
            r#"<form method="get" action="/"><input type="hidden" name="ingredients" value="{0}"><input type="hidden" name="dietary_prefs" value="{1}"><input type="hidden" name="allergies" value="{2}"><input type="hidden" name="favorite_cuisines" value="{3}"><button type="submit">{0}</button></form>"#,
            html_escape(ingredients),
            html_escape(dietary),
            html_escape(allergies),
            html_escape(cuisines),
        );
    }
    page.push_str("</div>\n");

    match outcome {
        Some(Outcome::Recipe(markdown)) => {
            let _ = write!(
                page,
                "<h2>Generated Recipe</h2>\n<pre class=\"recipe\">{}</pre>\n",
                html_escape(markdown)
            );
        }
        Some(Outcome::Error(message)) => {
            let _ = write!(
                page,
                "<h2>Generated Recipe</h2>\n<pre class=\"error\">{}</pre>\n",
                html_escape(message)
            );
        }
        None => {}
    }

    page.push_str(
        r#"<hr>
<h3>💡 Tips</h3>
<ul>
<li>Be specific with your ingredients for better results</li>
<li>The AI may suggest common pantry staples (salt, pepper, oil) if needed</li>
<li>Allergies are strictly avoided in generated recipes</li>
<li>Dietary preferences help tailor the recipe to your needs</li>
</ul>
</body>
</html>
"#,
    );

    page
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
