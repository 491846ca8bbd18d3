use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::auth::password;
use crate::database::models::{Account, Gym, NewAccount, Rating};

/// Errors surfaced by every storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    NotFound(String),

    /// Foreign-key, range or not-null rule rejected the write
    #[error("{0}")]
    ConstraintViolation(String),

    /// Unique rule rejected the write
    #[error("{0}")]
    Duplicate(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage call exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("Failed to hash credential: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl StorageError {
    pub fn gym_not_found(id: i32) -> Self {
        StorageError::NotFound(format!("Gym with ID: {} not found.", id))
    }

    pub fn account_not_found(key: impl std::fmt::Display) -> Self {
        StorageError::NotFound(format!("Account {} not found", key))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                classify_sqlstate(db_err.code().as_deref(), db_err.message().to_string())
            }
            other => StorageError::Unavailable(other.to_string()),
        }
    }
}

/// Maps a Postgres SQLSTATE to a storage error. Class 23 (integrity) and
/// class 22 (data exception, e.g. 22001 value too long, 22P02 bad text
/// representation) are the caller's fault; everything else is an outage.
fn classify_sqlstate(code: Option<&str>, message: String) -> StorageError {
    match code {
        Some("23505") => StorageError::Duplicate(message),
        Some("23503") | Some("23514") | Some("23502") => StorageError::ConstraintViolation(message),
        Some(code) if code.starts_with("22") => StorageError::ConstraintViolation(message),
        _ => StorageError::Unavailable(message),
    }
}

/// Persistence contract between the HTTP handlers and a backend.
///
/// Every mutating call is a single-row write; cross-entity consistency
/// (a rating pointing at a live gym, unique usernames) is left to the
/// backend's own constraints.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persists a new gym and returns it with its assigned id and a zero rating.
    async fn create_gym(&self, gym: &Gym) -> Result<Gym, StorageError>;

    /// Looks up one gym. The `rating` field is left at zero.
    async fn get_gym_by_id(&self, id: i32) -> Result<Gym, StorageError>;

    /// All gyms ordered by id, each with its average rating filled in.
    async fn get_gyms(&self) -> Result<Vec<Gym>, StorageError>;

    /// Replaces name and description of an existing gym.
    async fn update_gym(&self, gym: &Gym) -> Result<Gym, StorageError>;

    /// Removes a gym together with its ratings. Unknown ids are `NotFound`.
    async fn delete_gym(&self, id: i32) -> Result<(), StorageError>;

    /// Fails with `ConstraintViolation` when the gym does not exist or the
    /// score is outside 1..=5.
    async fn create_rating(&self, rating: &Rating) -> Result<Rating, StorageError>;

    async fn get_ratings(&self, gym_id: i32) -> Result<Vec<Rating>, StorageError>;

    /// Mean score for a gym, zero when it has no ratings.
    async fn get_average_rating(&self, gym_id: i32) -> Result<f64, StorageError>;

    /// Hashes the plaintext password and persists the account. A taken
    /// username is `Duplicate`.
    async fn create_account(&self, account: &NewAccount) -> Result<Account, StorageError>;

    async fn get_accounts(&self) -> Result<Vec<Account>, StorageError>;

    async fn get_account_by_id(&self, id: i32) -> Result<Account, StorageError>;

    async fn get_account_by_username(&self, user_name: &str) -> Result<Account, StorageError>;

    /// Compares a plaintext password with a stored hash. Never fails; a
    /// mismatch or malformed hash is `false`.
    async fn verify_credential(&self, password: &str, stored_hash: &str) -> bool {
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
            .await
            .unwrap_or(false)
    }
}

/// Runs bcrypt off the async executor.
pub(crate) async fn hash_off_thread(password: &str, cost: u32) -> Result<String, StorageError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || password::hash_password(&password, cost))
        .await
        .map_err(|e| StorageError::Unavailable(format!("hashing task failed: {}", e)))?
        .map_err(StorageError::from)
}
