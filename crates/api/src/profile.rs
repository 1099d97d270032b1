use chrono::{DateTime, Utc};
use pantry::Preferences;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Saved cooking preferences, used when a request brings none of its own
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub dietary_prefs: Vec<String>,
    pub allergies: Vec<String>,
    pub favorite_cuisines: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dietary_prefs: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Free-text allergies, comma separated, appended to `allergies`
    #[serde(default)]
    pub custom_allergies: Option<String>,
    #[serde(default)]
    pub favorite_cuisines: Vec<String>,
}

impl Profile {
    pub fn preferences(&self) -> Preferences {
        Preferences::from_lists(&self.dietary_prefs, &self.allergies, &self.favorite_cuisines)
    }
}

pub struct ProfileStore {
    profile: RwLock<Profile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self {
            profile: RwLock::new(Profile::default()),
        }
    }

    pub async fn get(&self) -> Profile {
        self.profile.read().await.clone()
    }

    pub async fn update(&self, update: ProfileUpdate) -> Profile {
        let mut allergies = update.allergies;
        if let Some(custom) = update.custom_allergies {
            allergies.extend(
                custom
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }

        let mut profile = self.profile.write().await;
        *profile = Profile {
            name: update.name.filter(|n| !n.trim().is_empty()),
            dietary_prefs: update.dietary_prefs,
            allergies,
            favorite_cuisines: update.favorite_cuisines,
            updated_at: Some(Utc::now()),
        };
        profile.clone()
    }

    pub async fn preferences(&self) -> Preferences {
        self.profile.read().await.preferences()
    }
}
