use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::database::models::{Account, Gym, NewAccount, Rating};
use crate::database::storage::{hash_off_thread, Storage, StorageError};

const GYM_COLUMNS: &str = "id, name, description, created_at, updated_at";
const RATING_COLUMNS: &str = "id, gym_id, rating, user_name, review, created_at, updated_at";
const ACCOUNT_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";

/// `Storage` backed by PostgreSQL through a shared sqlx pool.
pub struct PostgresStorage {
    pool: PgPool,
    query_timeout: Duration,
    bcrypt_cost: u32,
}

impl PostgresStorage {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            pool,
            query_timeout: config.database.query_timeout(),
            bcrypt_cost: config.security.bcrypt_cost,
        }
    }

    /// Applies the request-scoped deadline to a single store call.
    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                let err = StorageError::from(err);
                if !err.is_not_found() {
                    warn!("{} failed: {}", operation, err);
                }
                Err(err)
            }
            Err(_) => {
                warn!("{} exceeded {:?}", operation, self.query_timeout);
                Err(StorageError::Timeout(self.query_timeout))
            }
        }
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn create_gym(&self, gym: &Gym) -> Result<Gym, StorageError> {
        let sql = format!(
            "INSERT INTO gyms (name, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            GYM_COLUMNS
        );
        let created = self
            .timed(
                "create_gym",
                sqlx::query_as::<_, Gym>(&sql)
                    .bind(&gym.name)
                    .bind(&gym.description)
                    .bind(gym.created_at)
                    .bind(gym.updated_at)
                    .fetch_one(&self.pool),
            )
            .await?;

        info!("Created gym {} ({})", created.id, created.name);
        Ok(created)
    }

    async fn get_gym_by_id(&self, id: i32) -> Result<Gym, StorageError> {
        let sql = format!("SELECT {} FROM gyms WHERE id = $1", GYM_COLUMNS);
        self.timed(
            "get_gym_by_id",
            sqlx::query_as::<_, Gym>(&sql).bind(id).fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| StorageError::gym_not_found(id))
    }

    async fn get_gyms(&self) -> Result<Vec<Gym>, StorageError> {
        // One aggregate join instead of an average lookup per gym
        let sql = "SELECT g.id, g.name, g.description, g.created_at, g.updated_at, \
                   COALESCE(AVG(r.rating), 0)::FLOAT8 AS rating \
                   FROM gyms g LEFT JOIN ratings r ON r.gym_id = g.id \
                   GROUP BY g.id ORDER BY g.id";
        self.timed("get_gyms", sqlx::query_as::<_, Gym>(sql).fetch_all(&self.pool))
            .await
    }

    async fn update_gym(&self, gym: &Gym) -> Result<Gym, StorageError> {
        let sql = format!(
            "UPDATE gyms SET name = $2, description = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {}",
            GYM_COLUMNS
        );
        self.timed(
            "update_gym",
            sqlx::query_as::<_, Gym>(&sql)
                .bind(gym.id)
                .bind(&gym.name)
                .bind(&gym.description)
                .bind(Utc::now())
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| StorageError::gym_not_found(gym.id))
    }

    async fn delete_gym(&self, id: i32) -> Result<(), StorageError> {
        let result = self
            .timed(
                "delete_gym",
                sqlx::query("DELETE FROM gyms WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::gym_not_found(id));
        }
        info!("Gym with id {} successfully deleted", id);
        Ok(())
    }

    async fn create_rating(&self, rating: &Rating) -> Result<Rating, StorageError> {
        let sql = format!(
            "INSERT INTO ratings (gym_id, rating, user_name, review, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            RATING_COLUMNS
        );
        self.timed(
            "create_rating",
            sqlx::query_as::<_, Rating>(&sql)
                .bind(rating.gym_id)
                .bind(rating.rating)
                .bind(&rating.user_name)
                .bind(&rating.review)
                .bind(rating.created_at)
                .bind(rating.updated_at)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn get_ratings(&self, gym_id: i32) -> Result<Vec<Rating>, StorageError> {
        let sql = format!(
            "SELECT {} FROM ratings WHERE gym_id = $1 ORDER BY id",
            RATING_COLUMNS
        );
        self.timed(
            "get_ratings",
            sqlx::query_as::<_, Rating>(&sql)
                .bind(gym_id)
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn get_average_rating(&self, gym_id: i32) -> Result<f64, StorageError> {
        debug!("Getting average rating for gym with ID: {}", gym_id);
        let (average,): (f64,) = self
            .timed(
                "get_average_rating",
                sqlx::query_as(
                    "SELECT COALESCE(AVG(rating), 0)::FLOAT8 FROM ratings WHERE gym_id = $1",
                )
                .bind(gym_id)
                .fetch_one(&self.pool),
            )
            .await?;
        Ok(average)
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account, StorageError> {
        let password_hash = hash_off_thread(&account.password, self.bcrypt_cost).await?;

        let sql = format!(
            "INSERT INTO accounts (username, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            ACCOUNT_COLUMNS
        );
        let created = self
            .timed(
                "create_account",
                sqlx::query_as::<_, Account>(&sql)
                    .bind(&account.user_name)
                    .bind(&password_hash)
                    .bind(account.created_at)
                    .bind(account.updated_at)
                    .fetch_one(&self.pool),
            )
            .await?;

        info!("Created account {} ({})", created.id, created.user_name);
        Ok(created)
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StorageError> {
        let sql = format!("SELECT {} FROM accounts ORDER BY id", ACCOUNT_COLUMNS);
        self.timed(
            "get_accounts",
            sqlx::query_as::<_, Account>(&sql).fetch_all(&self.pool),
        )
        .await
    }

    async fn get_account_by_id(&self, id: i32) -> Result<Account, StorageError> {
        let sql = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        self.timed(
            "get_account_by_id",
            sqlx::query_as::<_, Account>(&sql)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| StorageError::account_not_found(id))
    }

    async fn get_account_by_username(&self, user_name: &str) -> Result<Account, StorageError> {
        let sql = format!("SELECT {} FROM accounts WHERE username = $1", ACCOUNT_COLUMNS);
        self.timed(
            "get_account_by_username",
            sqlx::query_as::<_, Account>(&sql)
                .bind(user_name)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| StorageError::account_not_found(user_name))
    }
}
