use std::sync::Arc;

use tracing::{info, warn};

use toilet_db::models::{NewReview, NewToilet};
use toilet_db::{CredentialStore, StoreError};
use toilet_types::api::{AddReviewRequest, AddToiletRequest};
use toilet_types::models::{Review, Toilet, User};

use crate::auth::{Authenticator, Identity};
use crate::error::{Result, ServiceError};

const MAX_USERNAME_CHARS: usize = 64;
const MAX_PASSWORD_BYTES: usize = 128;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// Business operations over a credential store. This is where ownership and
/// input rules are enforced; callers pass the already-validated identity in.
///
/// Every method blocks (store I/O, password hashing). Async callers should run
/// them on the blocking pool.
pub struct ToiletService {
    store: Arc<dyn CredentialStore>,
    auth: Arc<Authenticator>,
}

impl ToiletService {
    pub fn new(store: Arc<dyn CredentialStore>, auth: Arc<Authenticator>) -> Self {
        Self { store, auth }
    }

    // -- Users --

    /// Usernames are trimmed before they are stored, so `" alice"` and
    /// `"alice"` are the same account.
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::validation("username must not be empty"));
        }
        if username.chars().count() > MAX_USERNAME_CHARS {
            return Err(ServiceError::validation(format!(
                "username must be at most {} characters",
                MAX_USERNAME_CHARS
            )));
        }
        if password.is_empty() {
            return Err(ServiceError::validation("password must not be empty"));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(ServiceError::validation(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        let password_hash = self
            .auth
            .hash_password(password)
            .map_err(ServiceError::Internal)?;

        let user = self.store.create_user(username, &password_hash)?;
        info!("Registered user {} ({})", user.username, user.id);
        Ok(user.into())
    }

    /// Returns a signed bearer token. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        let user = match self.store.get_user_by_username(username.trim()) {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                self.auth.verify_dummy(password);
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self.auth.verify_password(password, &user.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self
            .auth
            .issue_token(user.id)
            .map_err(ServiceError::Internal)?;
        info!("User {} logged in", user.id);
        Ok(token)
    }

    // -- Toilets --

    pub fn list_toilets(&self) -> Result<Vec<Toilet>> {
        Ok(self.store.list_toilets()?)
    }

    /// The founder is always the caller; clients cannot pick one.
    pub fn add_toilet(&self, identity: Identity, req: &AddToiletRequest) -> Result<Toilet> {
        if req.name.trim().is_empty() {
            return Err(ServiceError::validation("name must not be empty"));
        }
        parse_point(&req.point)?;

        // Stored exactly as sent; trimming is only for validation.
        let new_toilet = NewToilet {
            founder_id: identity.user_id(),
            name: req.name.clone(),
            point: req.point.clone(),
            kind: req.kind.clone(),
        };

        let toilet = self.store.create_toilet(&new_toilet).map_err(|e| match e {
            // The token was valid but its user is gone.
            StoreError::MissingReference => ServiceError::Unauthorized,
            other => other.into(),
        })?;

        info!("User {} added toilet {}", toilet.founder_id, toilet.id);
        Ok(toilet)
    }

    /// Ownership is decided by the store's conditional delete alone, so there
    /// is no window between a check and the delete.
    pub fn delete_toilet(&self, identity: Identity, toilet_id: i64) -> Result<()> {
        if toilet_id <= 0 {
            return Err(ServiceError::NotAuthorizedOrMissing);
        }

        match self.store.delete_toilet(toilet_id, identity.user_id()) {
            Ok(()) => {
                info!("User {} deleted toilet {}", identity.user_id(), toilet_id);
                Ok(())
            }
            Err(StoreError::NotAuthorizedOrMissing) => {
                warn!(
                    "User {} failed to delete toilet {} (not founder or missing)",
                    identity.user_id(),
                    toilet_id
                );
                Err(ServiceError::NotAuthorizedOrMissing)
            }
            Err(e) => Err(e.into()),
        }
    }

    // -- Reviews --

    pub fn add_review(&self, identity: Identity, req: &AddReviewRequest) -> Result<Review> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&req.score) {
            return Err(ServiceError::validation(format!(
                "score must be between {} and {}",
                MIN_SCORE, MAX_SCORE
            )));
        }
        if identity.user_id() == 0 || req.toilet_id <= 0 {
            return Err(ServiceError::validation("missing required fields"));
        }

        let new_review = NewReview {
            user_id: identity.user_id(),
            toilet_id: req.toilet_id,
            title: req.title.clone(),
            review_text: req.review_text.clone(),
            score: req.score,
        };

        let review = self.store.create_review(&new_review).map_err(|e| match e {
            StoreError::MissingReference => ServiceError::validation("toilet does not exist"),
            other => other.into(),
        })?;

        info!(
            "User {} reviewed toilet {} (review {})",
            review.user_id, review.toilet_id, review.id
        );
        Ok(review)
    }

    pub fn list_reviews_by_toilet(&self, toilet_id: i64) -> Result<Vec<Review>> {
        Ok(self.store.list_reviews_by_toilet(toilet_id)?)
    }
}

/// Parses a "lat,lng" pair and checks it lies on the globe.
pub fn parse_point(point: &str) -> Result<(f64, f64)> {
    let invalid = || ServiceError::validation("point must be \"lat,lng\"");

    let (lat, lng) = point.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ServiceError::validation("point is out of range"));
    }
    Ok((lat, lng))
}
