use serde::{Deserialize, Serialize};

use crate::models::Toilet;

// -- JWT Claims --

/// Bearer token payload. `user_id` must decode as an integer; anything else
/// fails deserialization and the token is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// -- Toilets --

/// Body of an add-toilet call. Clients sometimes echo a `founder_id` back;
/// unknown fields are tolerated and the founder always comes from the token.
#[derive(Debug, Deserialize)]
pub struct AddToiletRequest {
    pub name: String,
    pub point: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddToiletResponse {
    pub id: i64,
    pub founder_id: i64,
    pub name: String,
    pub point: String,
}

impl From<Toilet> for AddToiletResponse {
    fn from(toilet: Toilet) -> Self {
        Self {
            id: toilet.id,
            founder_id: toilet.founder_id,
            name: toilet.name,
            point: toilet.point,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteToiletRequest {
    pub id: i64,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub toilet_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub review_text: String,
    pub score: f64,
}

// -- Shared --

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
