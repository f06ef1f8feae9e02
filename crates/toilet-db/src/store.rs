use thiserror::Error;
use toilet_types::models::{Review, Toilet};

use crate::models::{NewReview, NewToilet, UserRecord};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures every backend reports the same way.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    Conflict,

    #[error("user not found")]
    NotFound,

    /// A conditional delete matched no row. Covers both "no such toilet" and
    /// "toilet belongs to someone else" so callers cannot probe existence.
    #[error("not authorized or toilet not found")]
    NotAuthorizedOrMissing,

    #[error("referenced record does not exist")]
    MissingReference,

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.into())
    }
}

/// Persistence capabilities the domain layer needs. Implementations must be
/// safe to share across request tasks.
pub trait CredentialStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<UserRecord>;

    fn get_user_by_username(&self, username: &str) -> StoreResult<UserRecord>;

    /// All toilets in insertion order.
    fn list_toilets(&self) -> StoreResult<Vec<Toilet>>;

    fn create_toilet(&self, toilet: &NewToilet) -> StoreResult<Toilet>;

    /// Deletes only when a row matches both `toilet_id` and
    /// `founder_id = requester_id`, atomically.
    fn delete_toilet(&self, toilet_id: i64, requester_id: i64) -> StoreResult<()>;

    fn create_review(&self, review: &NewReview) -> StoreResult<Review>;

    /// Reviews for a toilet in insertion order. Unknown toilets yield an
    /// empty list.
    fn list_reviews_by_toilet(&self, toilet_id: i64) -> StoreResult<Vec<Review>>;
}
