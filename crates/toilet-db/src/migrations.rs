use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, toilets, reviews)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                password        TEXT NOT NULL,
                toilets_found   INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE toilets (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                founder_id  INTEGER NOT NULL REFERENCES users(id),
                name        TEXT NOT NULL,
                point       TEXT NOT NULL,
                type        TEXT
            );

            CREATE TABLE reviews (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                toilet_id   INTEGER NOT NULL REFERENCES toilets(id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                review_text TEXT NOT NULL,
                score       REAL NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_reviews_toilet ON reviews(toilet_id, id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
