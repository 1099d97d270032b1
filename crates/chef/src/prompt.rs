use pantry::PantryRequest;

use crate::llm::ChatMessage;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful chef assistant. Always respond with valid JSON only.";

pub fn build_recipe_prompt(request: &PantryRequest) -> String {
    let prefs = &request.preferences;

    let allergies = match &prefs.allergies {
        Some(allergies) => format!("AVOID: {}", allergies),
        None => "No allergies".to_string(),
    };
    let dietary = match &prefs.dietary {
        Some(dietary) => format!("Dietary: {}", dietary),
        None => "No restrictions".to_string(),
    };
    let cuisine = match &prefs.cuisines {
        Some(cuisines) => format!("Cuisine: {}", cuisines),
        None => "Any cuisine".to_string(),
    };

    format!(
        r#"Create a recipe using these ingredients: {}.

Requirements:
- Use only provided ingredients (can add salt, pepper, oil, water)
- {}
- {}
- {}

Return ONLY this JSON format (no other text):
{{
  "title": "Recipe name",
  "description": "Brief description",
  "ingredients": ["ingredient 1 with quantity", "ingredient 2"],
  "instructions": ["Step 1", "Step 2"],
  "prep_time": "time in minutes"
}}"#,
        request.ingredient_line(),
        allergies,
        dietary,
        cuisine
    )
}

pub fn build_repair_prompt(invalid_reply: &str) -> String {
    format!(
        r#"The following recipe JSON is invalid:

{}

Fix this JSON. Output only valid JSON with the keys "title", "description", "ingredients", "instructions" and "prep_time". No markdown formatting, no code blocks, no explanations. Just the raw JSON object."#,
        invalid_reply
    )
}

pub fn build_messages(request: &PantryRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_recipe_prompt(request)),
    ]
}

pub fn build_repair_messages(invalid_reply: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_repair_prompt(invalid_reply)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry::Preferences;

    #[test]
    fn test_unconstrained_prompt() {
        let request = PantryRequest::parse("Chicken, Rice", Preferences::default()).unwrap();
        let prompt = build_recipe_prompt(&request);

        assert!(prompt.starts_with("Create a recipe using these ingredients: Chicken, Rice.\n"));
        assert!(prompt.contains("- No allergies\n- No restrictions\n- Any cuisine\n"));
        assert!(prompt.contains("\"prep_time\": \"time in minutes\"\n}"));
    }

    #[test]
    fn test_constraints_are_interpolated() {
        let prefs = Preferences::from_fields("Vegan", "Nuts", "Asian");
        let request = PantryRequest::parse("Tofu, Broccoli", prefs).unwrap();
        let prompt = build_recipe_prompt(&request);

        assert!(prompt.contains("- AVOID: Nuts\n- Dietary: Vegan\n- Cuisine: Asian\n"));
        assert!(!prompt.contains("No allergies"));
    }

    #[test]
    fn test_messages_order() {
        let request = PantryRequest::parse("eggs", Preferences::default()).unwrap();
        let messages = build_messages(&request);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_repair_prompt_embeds_reply() {
        let prompt = build_repair_prompt("{\"title\": ");
        assert!(prompt.contains("{\"title\": "));
        assert!(prompt.contains("Just the raw JSON object."));
    }
}
