use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Body of `POST /gyms`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGymRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /gyms/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGymRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Gym {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Mean of the gym's ratings. Never stored on the gym row; queries that
    /// do not aggregate leave it at zero.
    #[sqlx(default)]
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gym {
    /// Unsaved gym; storage assigns the id.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            description,
            rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }
}
