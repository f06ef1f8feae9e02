//! Store-side record types. `UserRecord` carries the password hash and is
//! distinct from the outward `toilet_types::models::User`.
use toilet_types::models::User;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub toilets_found: i64,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            username: record.username,
            toilets_found: record.toilets_found,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewToilet {
    pub founder_id: i64,
    pub name: String,
    pub point: String,
    pub kind: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: i64,
    pub toilet_id: i64,
    pub title: String,
    pub review_text: String,
    pub score: f64,
}
