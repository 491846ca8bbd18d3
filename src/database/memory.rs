use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::models::{
    fits_name_column, Account, Gym, NewAccount, Rating, MAX_NAME_LENGTH, MAX_RATING, MIN_RATING,
};
use crate::database::storage::{hash_off_thread, Storage, StorageError};

/// In-process backend with the same rules the relational schema enforces:
/// cascading gym deletes, the rating range check, the gym foreign key,
/// unique usernames and the `VARCHAR(100)` name columns.
pub struct MemoryStorage {
    bcrypt_cost: u32,
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    gyms: BTreeMap<i32, Gym>,
    ratings: BTreeMap<i32, Rating>,
    accounts: BTreeMap<i32, Account>,
    next_gym_id: i32,
    next_rating_id: i32,
    next_account_id: i32,
}

impl Tables {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    fn average_rating(&self, gym_id: i32) -> f64 {
        let (sum, count) = self
            .ratings
            .values()
            .filter(|r| r.gym_id == gym_id)
            .fold((0i64, 0i64), |(sum, count), r| (sum + r.rating as i64, count + 1));

        if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        }
    }
}

fn check_gym_name(name: &str) -> Result<(), StorageError> {
    if name.trim().is_empty() {
        return Err(StorageError::ConstraintViolation(
            "gym name must not be empty".to_string(),
        ));
    }
    if !fits_name_column(name) {
        return Err(StorageError::ConstraintViolation(format!(
            "gym name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

impl MemoryStorage {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self {
            bcrypt_cost,
            inner: RwLock::new(Tables::default()),
        }
    }

    /// Number of stored ratings across all gyms.
    pub async fn rating_count(&self) -> usize {
        self.inner.read().await.ratings.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_gym(&self, gym: &Gym) -> Result<Gym, StorageError> {
        check_gym_name(&gym.name)?;

        let mut tables = self.inner.write().await;
        let id = Tables::next_id(&mut tables.next_gym_id);
        let stored = Gym {
            id,
            rating: 0.0,
            ..gym.clone()
        };
        tables.gyms.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_gym_by_id(&self, id: i32) -> Result<Gym, StorageError> {
        self.inner
            .read()
            .await
            .gyms
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::gym_not_found(id))
    }

    async fn get_gyms(&self) -> Result<Vec<Gym>, StorageError> {
        let tables = self.inner.read().await;
        Ok(tables
            .gyms
            .values()
            .map(|gym| gym.clone().with_rating(tables.average_rating(gym.id)))
            .collect())
    }

    async fn update_gym(&self, gym: &Gym) -> Result<Gym, StorageError> {
        check_gym_name(&gym.name)?;

        let mut tables = self.inner.write().await;
        let existing = tables
            .gyms
            .get_mut(&gym.id)
            .ok_or_else(|| StorageError::gym_not_found(gym.id))?;

        existing.name = gym.name.clone();
        existing.description = gym.description.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_gym(&self, id: i32) -> Result<(), StorageError> {
        let mut tables = self.inner.write().await;
        if tables.gyms.remove(&id).is_none() {
            return Err(StorageError::gym_not_found(id));
        }
        tables.ratings.retain(|_, rating| rating.gym_id != id);
        Ok(())
    }

    async fn create_rating(&self, rating: &Rating) -> Result<Rating, StorageError> {
        if !rating.has_valid_score() {
            return Err(StorageError::ConstraintViolation(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating.rating
            )));
        }

        let mut tables = self.inner.write().await;
        if !tables.gyms.contains_key(&rating.gym_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "gym {} does not exist",
                rating.gym_id
            )));
        }

        let id = Tables::next_id(&mut tables.next_rating_id);
        let stored = Rating {
            id,
            ..rating.clone()
        };
        tables.ratings.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_ratings(&self, gym_id: i32) -> Result<Vec<Rating>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .ratings
            .values()
            .filter(|r| r.gym_id == gym_id)
            .cloned()
            .collect())
    }

    async fn get_average_rating(&self, gym_id: i32) -> Result<f64, StorageError> {
        Ok(self.inner.read().await.average_rating(gym_id))
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account, StorageError> {
        if account.user_name.is_empty() {
            return Err(StorageError::ConstraintViolation(
                "username must not be empty".to_string(),
            ));
        }
        if !fits_name_column(&account.user_name) {
            return Err(StorageError::ConstraintViolation(format!(
                "username must be at most {} characters",
                MAX_NAME_LENGTH
            )));
        }

        // Hash before taking the write lock
        let password_hash = hash_off_thread(&account.password, self.bcrypt_cost).await?;

        let mut tables = self.inner.write().await;
        if tables
            .accounts
            .values()
            .any(|existing| existing.user_name == account.user_name)
        {
            return Err(StorageError::Duplicate(format!(
                "username '{}' is already taken",
                account.user_name
            )));
        }

        let id = Tables::next_id(&mut tables.next_account_id);
        let stored = Account {
            id,
            user_name: account.user_name.clone(),
            password_hash,
            created_at: account.created_at,
            updated_at: account.updated_at,
        };
        tables.accounts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StorageError> {
        Ok(self.inner.read().await.accounts.values().cloned().collect())
    }

    async fn get_account_by_id(&self, id: i32) -> Result<Account, StorageError> {
        self.inner
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::account_not_found(id))
    }

    async fn get_account_by_username(&self, user_name: &str) -> Result<Account, StorageError> {
        self.inner
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.user_name == user_name)
            .cloned()
            .ok_or_else(|| StorageError::account_not_found(user_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> MemoryStorage {
        MemoryStorage::new(4)
    }

    async fn gym(store: &MemoryStorage, name: &str) -> Gym {
        store
            .create_gym(&Gym::new(name, Some("open late".to_string())))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn created_gym_gets_id_and_zero_rating() {
        let store = storage();
        let created = gym(&store, "Iron Temple").await;

        assert_ne!(created.id, 0);
        assert_eq!(created.rating, 0.0);

        let fetched = store.get_gym_by_id(created.id).await.unwrap();
        assert_eq!(fetched.name, "Iron Temple");
        assert_eq!(fetched.description.as_deref(), Some("open late"));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let store = storage();
        let err = store.create_gym(&Gym::new("  ", None)).await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn names_longer_than_column_are_rejected() {
        let store = storage();
        let long = "x".repeat(MAX_NAME_LENGTH + 1);

        let err = store.create_gym(&Gym::new(long.as_str(), None)).await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        let mut existing = gym(&store, "Iron Temple").await;
        existing.name = long.clone();
        let err = store.update_gym(&existing).await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));

        let err = store
            .create_account(&NewAccount::new(long.as_str(), "s3cret"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
        assert!(store.get_accounts().await.unwrap().is_empty());

        // Limit counts characters, not bytes
        let exact = "é".repeat(MAX_NAME_LENGTH);
        assert!(store.create_gym(&Gym::new(exact.as_str(), None)).await.is_ok());
    }

    #[tokio::test]
    async fn average_rating_is_mean_or_zero() {
        let store = storage();
        let g = gym(&store, "Iron Temple").await;
        assert_eq!(store.get_average_rating(g.id).await.unwrap(), 0.0);

        for score in [3, 5] {
            store
                .create_rating(&Rating::new(g.id, score, "alice", None))
                .await
                .unwrap();
        }
        assert_eq!(store.get_average_rating(g.id).await.unwrap(), 4.0);

        let listed = store.get_gyms().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].rating, 4.0);
    }

    #[tokio::test]
    async fn rating_requires_existing_gym_and_valid_score() {
        let store = storage();
        let g = gym(&store, "Iron Temple").await;

        let missing = store
            .create_rating(&Rating::new(g.id + 100, 3, "alice", None))
            .await
            .unwrap_err();
        assert!(matches!(missing, StorageError::ConstraintViolation(_)));

        for score in [0, 6] {
            let err = store
                .create_rating(&Rating::new(g.id, score, "alice", None))
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::ConstraintViolation(_)));
        }
        assert_eq!(store.rating_count().await, 0);

        for score in 1..=5 {
            store
                .create_rating(&Rating::new(g.id, score, "alice", None))
                .await
                .unwrap();
        }
        assert_eq!(store.rating_count().await, 5);
    }

    #[tokio::test]
    async fn delete_cascades_to_ratings() {
        let store = storage();
        let doomed = gym(&store, "Doomed").await;
        let kept = gym(&store, "Kept").await;
        store
            .create_rating(&Rating::new(doomed.id, 2, "alice", None))
            .await
            .unwrap();
        store
            .create_rating(&Rating::new(kept.id, 5, "alice", None))
            .await
            .unwrap();

        store.delete_gym(doomed.id).await.unwrap();

        assert!(store.get_gym_by_id(doomed.id).await.unwrap_err().is_not_found());
        assert!(store.get_ratings(doomed.id).await.unwrap().is_empty());
        assert_eq!(store.get_ratings(kept.id).await.unwrap().len(), 1);
        assert!(store.delete_gym(doomed.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn update_changes_fields_of_existing_gym_only() {
        let store = storage();
        let g = gym(&store, "Old Name").await;

        let mut changed = g.clone();
        changed.name = "New Name".to_string();
        changed.description = None;
        let updated = store.update_gym(&changed).await.unwrap();
        assert_eq!(updated.name, "New Name");
        assert!(updated.description.is_none());
        assert!(updated.updated_at >= g.updated_at);

        changed.id = 999;
        assert!(store.update_gym(&changed).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn accounts_are_unique_and_hashed() {
        let store = storage();
        let created = store
            .create_account(&NewAccount::new("alice", "s3cret"))
            .await
            .unwrap();

        assert_ne!(created.password_hash, "s3cret");
        assert!(store.verify_credential("s3cret", &created.password_hash).await);
        assert!(!store.verify_credential("S3cret", &created.password_hash).await);

        let dup = store
            .create_account(&NewAccount::new("alice", "other"))
            .await
            .unwrap_err();
        assert!(matches!(dup, StorageError::Duplicate(_)));

        let by_name = store.get_account_by_username("alice").await.unwrap();
        let by_id = store.get_account_by_id(created.id).await.unwrap();
        assert_eq!(by_name, by_id);
        assert_eq!(store.get_accounts().await.unwrap().len(), 1);

        assert!(store.get_account_by_username("bob").await.unwrap_err().is_not_found());
        assert!(store.get_account_by_id(77).await.unwrap_err().is_not_found());
    }
}
