//! Domain types shared across the `StyleCast` modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An administrator-curated clothing category label shown to users for
/// preference selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Style {
    /// Unique style identifier
    pub id: Uuid,
    /// Display name, e.g. "casual" or "formal"
    pub name: String,
}

impl Style {
    /// Create a new style with a fresh identifier
    #[must_use]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Role carried by a logged-in user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Visitor,
}

/// A stored user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Argon2 PHC-format password hash, never the plain password
    pub password_hash: String,
    pub role: Role,
}

/// Current weather for one city, fetched per request and never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// City name as resolved by the weather provider
    pub city_name: String,
    /// Free-text condition description, e.g. "light rain"
    pub description: String,
    /// Provider icon code, e.g. "10d"
    pub icon: String,
    /// Temperature in Celsius
    pub temperature_c: f32,
    /// When this observation was fetched
    pub fetched_at: DateTime<Utc>,
}

impl WeatherObservation {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }
}

/// One stock-photo search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: u64,
    /// Photo page URL at the provider
    pub url: String,
    pub photographer: String,
    /// Alt text, when the provider supplies one
    pub alt: Option<String>,
    /// Direct image URL suitable for embedding
    pub src: String,
}
