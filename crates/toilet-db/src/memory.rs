use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use toilet_types::models::{Review, Toilet};

use crate::models::{NewReview, NewToilet, UserRecord};
use crate::store::{CredentialStore, StoreError, StoreResult};

/// Volatile backend for tests and throwaway runs. A single lock guards all
/// tables, so every operation is atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    toilets: Vec<Toilet>,
    reviews: Vec<StoredReview>,
    last_user_id: i64,
    last_toilet_id: i64,
    last_review_id: i64,
}

/// Reviews are kept without the denormalized username; it is joined on read
/// the same way the SQL backend does.
struct StoredReview {
    id: i64,
    user_id: i64,
    toilet_id: i64,
    title: String,
    review_text: String,
    score: f64,
    created_at: chrono::DateTime<Utc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| anyhow::anyhow!("Memory store lock poisoned: {}", e).into())
    }
}

impl Tables {
    fn user_exists(&self, id: i64) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn to_review(&self, stored: &StoredReview) -> Review {
        let username = self
            .users
            .iter()
            .find(|u| u.id == stored.user_id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| "unknown".to_string());

        Review {
            id: stored.id,
            user_id: stored.user_id,
            toilet_id: stored.toilet_id,
            title: stored.title.clone(),
            review_text: stored.review_text.clone(),
            score: stored.score,
            created_at: stored.created_at,
            username,
        }
    }
}

impl CredentialStore for MemoryStore {
    fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<UserRecord> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict);
        }

        tables.last_user_id += 1;
        let user = UserRecord {
            id: tables.last_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            toilets_found: 0,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<UserRecord> {
        self.tables()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn list_toilets(&self) -> StoreResult<Vec<Toilet>> {
        Ok(self.tables()?.toilets.clone())
    }

    fn create_toilet(&self, toilet: &NewToilet) -> StoreResult<Toilet> {
        let mut tables = self.tables()?;
        if !tables.user_exists(toilet.founder_id) {
            return Err(StoreError::MissingReference);
        }

        tables.last_toilet_id += 1;
        let stored = Toilet {
            id: tables.last_toilet_id,
            founder_id: toilet.founder_id,
            name: toilet.name.clone(),
            point: toilet.point.clone(),
            kind: toilet.kind.clone(),
        };
        tables.toilets.push(stored.clone());
        Ok(stored)
    }

    fn delete_toilet(&self, toilet_id: i64, requester_id: i64) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let position = tables
            .toilets
            .iter()
            .position(|t| t.id == toilet_id && t.founder_id == requester_id)
            .ok_or(StoreError::NotAuthorizedOrMissing)?;

        tables.toilets.remove(position);
        tables.reviews.retain(|r| r.toilet_id != toilet_id);
        Ok(())
    }

    fn create_review(&self, review: &NewReview) -> StoreResult<Review> {
        let mut tables = self.tables()?;
        let toilet_exists = tables.toilets.iter().any(|t| t.id == review.toilet_id);
        if !toilet_exists || !tables.user_exists(review.user_id) {
            return Err(StoreError::MissingReference);
        }

        tables.last_review_id += 1;
        let stored = StoredReview {
            id: tables.last_review_id,
            user_id: review.user_id,
            toilet_id: review.toilet_id,
            title: review.title.clone(),
            review_text: review.review_text.clone(),
            score: review.score,
            created_at: Utc::now(),
        };
        let created = tables.to_review(&stored);
        tables.reviews.push(stored);
        Ok(created)
    }

    fn list_reviews_by_toilet(&self, toilet_id: i64) -> StoreResult<Vec<Review>> {
        let tables = self.tables()?;
        Ok(tables
            .reviews
            .iter()
            .filter(|r| r.toilet_id == toilet_id)
            .map(|r| tables.to_review(r))
            .collect())
    }
}
