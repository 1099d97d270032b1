use serde::{Deserialize, Serialize};

/// Cooking constraints that shape the prompt. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub dietary: Option<String>,
    pub allergies: Option<String>,
    pub cuisines: Option<String>,
}

const DIETARY_SENTINELS: &[&str] = &["none", "none specified"];
const ALLERGY_SENTINELS: &[&str] = &["none"];
const CUISINE_SENTINELS: &[&str] = &["any", "any cuisine"];

impl Preferences {
    /// Build from free-text form fields, where `None` / `Any` are the defaults
    pub fn from_fields(dietary: &str, allergies: &str, cuisines: &str) -> Self {
        Self {
            dietary: unless_sentinel(dietary, DIETARY_SENTINELS),
            allergies: unless_sentinel(allergies, ALLERGY_SENTINELS),
            cuisines: unless_sentinel(cuisines, CUISINE_SENTINELS),
        }
    }

    /// Build from stored profile lists. Empty lists leave the field unset.
    pub fn from_lists(dietary: &[String], allergies: &[String], cuisines: &[String]) -> Self {
        Self {
            dietary: join_list(dietary).and_then(|s| unless_sentinel(&s, DIETARY_SENTINELS)),
            allergies: join_list(allergies).and_then(|s| unless_sentinel(&s, ALLERGY_SENTINELS)),
            cuisines: join_list(cuisines).and_then(|s| unless_sentinel(&s, CUISINE_SENTINELS)),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.dietary.is_none() && self.allergies.is_none() && self.cuisines.is_none()
    }
}

fn unless_sentinel(value: &str, sentinels: &[&str]) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    if sentinels.contains(&lowered.as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn join_list(items: &[String]) -> Option<String> {
    let parts: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
