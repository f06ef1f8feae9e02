use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account as seen by clients. The password hash never leaves
/// the store layer, so it has no field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub toilets_found: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toilet {
    pub id: i64,
    pub founder_id: i64,
    pub name: String,
    /// "lat,lng"
    pub point: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Reviews are append-only: created once, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub toilet_id: i64,
    pub title: String,
    pub review_text: String,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    /// Author's username, joined in on read.
    pub username: String,
}
