use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("fenced json pattern is valid")
});
static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("object span pattern is valid"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("trailing comma pattern is valid"));

/// Best-effort extraction of a JSON object from free model text.
///
/// Prefers a fenced ```json block. Otherwise takes the span from the first
/// `{` to the last `}`, retrying once with trailing commas removed.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Some(captures) = FENCED_JSON.captures(text) {
        if let Some(object) = parse_object(&captures[1]) {
            return Some(object);
        }
    }

    let span = OBJECT_SPAN.find(text)?.as_str();
    parse_object(span).or_else(|| parse_object(&strip_trailing_commas(span)))
}

pub fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_object() {
        let value = extract_json(r#"{"title": "Soup"}"#).unwrap();
        assert_eq!(value, json!({"title": "Soup"}));
    }

    #[test]
    fn test_surrounding_text() {
        let text = "Sure! Here is your recipe:\n{\"title\": \"Soup\", \"prep_time\": \"10\"}\nEnjoy!";
        assert_eq!(extract_json(text).unwrap()["title"], "Soup");
    }

    #[test]
    fn test_trailing_commas_repaired() {
        let text = r#"{"ingredients": ["a", "b",], "title": "X",
        }"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["ingredients"], json!(["a", "b"]));
        assert_eq!(value["title"], "X");
    }

    #[test]
    fn test_fenced_block_preferred() {
        let text = "# Soup\n\n{not json}\n\n```json\n{\"title\": \"Soup\"}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"title": "Soup"}));
    }

    #[test]
    fn test_broken_fence_falls_back_to_span() {
        // no closing brace anywhere
        let text = "```json\n{\"title\": \n```";
        assert!(extract_json(text).is_none());

        let text = "intro {\"title\": \"Stew\",} outro";
        assert_eq!(extract_json(text).unwrap()["title"], "Stew");
    }

    #[test]
    fn test_nothing_to_extract() {
        assert!(extract_json("").is_none());
        assert!(extract_json("I cannot help with that.").is_none());
        assert!(extract_json("{ this is not json }").is_none());
    }

    #[test]
    fn test_arrays_are_rejected() {
        assert!(extract_json("```json\n[1, 2]\n```").is_none());
    }

    #[test]
    fn test_strip_trailing_commas_keeps_inner_commas() {
        assert_eq!(strip_trailing_commas(r#"["a, b", "c", ]"#), r#"["a, b", "c" ]"#);
    }

    #[test]
    fn test_two_objects_span_both() {
        // the greedy span runs from the first `{` to the last `}`
        assert!(extract_json(r#"{"a": 1} and {"b": 2}"#).is_none());

        let fenced = "```json\n{\"a\": 1}\n```\nor {\"b\": 2}";
        assert_eq!(extract_json(fenced).unwrap(), json!({"a": 1}));
    }
}
