use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Body of `POST /gyms/:id/ratings`. The author is taken from the caller's
/// token, so any `userName` sent by the client is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRatingRequest {
    pub rating: i32,
    #[serde(default)]
    pub review: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i32,
    pub gym_id: i32,
    pub rating: i32,
    pub user_name: String,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(gym_id: i32, rating: i32, user_name: impl Into<String>, review: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            gym_id,
            rating,
            user_name: user_name.into(),
            review,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_valid_score(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bounds_are_inclusive() {
        let valid: Vec<i32> = (0..=6)
            .filter(|score| Rating::new(1, *score, "alice", None).has_valid_score())
            .collect();
        assert_eq!(valid, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn serializes_camel_case() {
        let rating = Rating::new(7, 4, "alice", Some("clean".to_string()));
        let value = serde_json::to_value(&rating).unwrap();
        assert_eq!(value["gymId"], 7);
        assert_eq!(value["userName"], "alice");
        assert!(value.get("createdAt").is_some());
    }
}
