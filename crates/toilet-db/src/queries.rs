use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, ErrorCode, Row, ffi};
use tracing::warn;

use toilet_types::models::{Review, Toilet};

use crate::Database;
use crate::models::{NewReview, NewToilet, UserRecord};
use crate::store::{CredentialStore, StoreError, StoreResult};

impl CredentialStore for Database {
    // -- Users --

    fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<UserRecord> {
        self.write(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )
            .map_err(classify)?;

            Ok(UserRecord {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                toilets_found: 0,
            })
        })
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<UserRecord> {
        self.read(|conn| query_user_by_username(conn, username))?
            .ok_or(StoreError::NotFound)
    }

    // -- Toilets --

    fn list_toilets(&self) -> StoreResult<Vec<Toilet>> {
        self.read(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, founder_id, name, point, type FROM toilets ORDER BY id")?;

            let rows = stmt
                .query_map([], toilet_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    fn create_toilet(&self, toilet: &NewToilet) -> StoreResult<Toilet> {
        self.write(|conn| {
            conn.execute(
                "INSERT INTO toilets (founder_id, name, point, type) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![toilet.founder_id, toilet.name, toilet.point, toilet.kind],
            )
            .map_err(classify)?;

            Ok(Toilet {
                id: conn.last_insert_rowid(),
                founder_id: toilet.founder_id,
                name: toilet.name.clone(),
                point: toilet.point.clone(),
                kind: toilet.kind.clone(),
            })
        })
    }

    fn delete_toilet(&self, toilet_id: i64, requester_id: i64) -> StoreResult<()> {
        self.write(|conn| {
            let affected = conn.execute(
                "DELETE FROM toilets WHERE id = ?1 AND founder_id = ?2",
                [toilet_id, requester_id],
            )?;

            if affected == 0 {
                return Err(StoreError::NotAuthorizedOrMissing);
            }
            Ok(())
        })
    }

    // -- Reviews --

    fn create_review(&self, review: &NewReview) -> StoreResult<Review> {
        self.write(|conn| {
            conn.execute(
                "INSERT INTO reviews (user_id, toilet_id, title, review_text, score)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    review.user_id,
                    review.toilet_id,
                    review.title,
                    review.review_text,
                    review.score,
                ],
            )
            .map_err(classify)?;

            let id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(&format!("{REVIEW_SELECT} WHERE r.id = ?1"))?;
            let row = stmt.query_row([id], review_from_row)?;
            Ok(row)
        })
    }

    fn list_reviews_by_toilet(&self, toilet_id: i64) -> StoreResult<Vec<Review>> {
        self.read(|conn| {
            // JOIN users so the author's name comes back in the same query
            let mut stmt =
                conn.prepare(&format!("{REVIEW_SELECT} WHERE r.toilet_id = ?1 ORDER BY r.id"))?;

            let rows = stmt
                .query_map([toilet_id], review_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

const REVIEW_SELECT: &str =
    "SELECT r.id, r.user_id, r.toilet_id, r.title, r.review_text, r.score, r.created_at, u.username
     FROM reviews r
     LEFT JOIN users u ON r.user_id = u.id";

fn query_user_by_username(conn: &Connection, username: &str) -> StoreResult<Option<UserRecord>> {
    let mut stmt = conn
        .prepare("SELECT id, username, password, toilets_found FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRecord {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                toilets_found: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn toilet_from_row(row: &Row<'_>) -> rusqlite::Result<Toilet> {
    Ok(Toilet {
        id: row.get(0)?,
        founder_id: row.get(1)?,
        name: row.get(2)?,
        point: row.get(3)?,
        kind: row.get(4)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    let id: i64 = row.get(0)?;
    let created_at: String = row.get(6)?;

    Ok(Review {
        id,
        user_id: row.get(1)?,
        toilet_id: row.get(2)?,
        title: row.get(3)?,
        review_text: row.get(4)?,
        score: row.get(5)?,
        created_at: parse_timestamp(&created_at).unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on review {}: {}", created_at, id, e);
            DateTime::default()
        }),
        username: row
            .get::<_, Option<String>>(7)?
            .unwrap_or_else(|| "unknown".to_string()),
    })
}

/// SQLite stores `datetime('now')` as "YYYY-MM-DD HH:MM:SS" without a zone.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    raw.parse::<DateTime<Utc>>().or_else(|_| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
    })
}

/// Maps constraint violations onto the store taxonomy; everything else is a
/// backend fault.
fn classify(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::Conflict;
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return StoreError::MissingReference,
                _ => {}
            }
        }
    }
    err.into()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
