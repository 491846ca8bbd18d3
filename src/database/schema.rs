use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

const CREATE_GYMS: &str = r#"
    CREATE TABLE IF NOT EXISTS gyms (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

const CREATE_RATINGS: &str = r#"
    CREATE TABLE IF NOT EXISTS ratings (
        id SERIAL PRIMARY KEY,
        gym_id INT NOT NULL REFERENCES gyms(id) ON DELETE CASCADE,
        rating INT NOT NULL CHECK (rating >= 1 AND rating <= 5),
        user_name VARCHAR(100) NOT NULL,
        review TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

const CREATE_RATINGS_GYM_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ratings_gym_id_idx ON ratings (gym_id)";

const CREATE_ACCOUNTS: &str = r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id SERIAL PRIMARY KEY,
        username VARCHAR(100) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Creates the gyms, ratings and accounts tables when missing. Ratings
/// reference gyms, so order matters.
pub async fn init_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in [CREATE_GYMS, CREATE_RATINGS, CREATE_RATINGS_GYM_INDEX, CREATE_ACCOUNTS] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema is up to date");
    Ok(())
}
