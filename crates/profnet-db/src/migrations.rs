use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

/// Initial schema. Applied in one transaction together with its
/// `schema_version` row.
const V1: &str = "
        CREATE TABLE users (
            user_id         TEXT PRIMARY KEY,
            password        TEXT NOT NULL,
            email           TEXT NOT NULL,
            name            TEXT,
            date_of_birth   TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE work_experience (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL REFERENCES users(user_id),
            company     TEXT NOT NULL,
            role        TEXT NOT NULL,
            location    TEXT NOT NULL,
            start_date  TEXT NOT NULL,
            end_date    TEXT
        );

        CREATE INDEX idx_work_experience_user ON work_experience(user_id);

        CREATE TABLE education_details (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL REFERENCES users(user_id),
            institution TEXT NOT NULL,
            major       TEXT NOT NULL,
            degree      TEXT NOT NULL,
            start_date  TEXT NOT NULL,
            end_date    TEXT
        );

        CREATE INDEX idx_education_details_user ON education_details(user_id);

        CREATE TABLE connections (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            requester_id    TEXT NOT NULL REFERENCES users(user_id),
            recipient_id    TEXT NOT NULL REFERENCES users(user_id),
            status          TEXT NOT NULL DEFAULT 'Request'
                            CHECK (status IN ('Request', 'Accept', 'Reject')),
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_connections_requester ON connections(requester_id, status);
        CREATE INDEX idx_connections_recipient ON connections(recipient_id, status);

        CREATE TABLE messages (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id       TEXT NOT NULL REFERENCES users(user_id),
            receiver_id     TEXT NOT NULL REFERENCES users(user_id),
            contents        TEXT NOT NULL CHECK (length(contents) <= 500),
            sent_at         TEXT NOT NULL DEFAULT (datetime('now')),
            status          TEXT NOT NULL DEFAULT 'Delivered'
                            CHECK (status IN ('Delivered', 'Read', 'Draft', 'Failed to Deliver')),
            delete_status   INTEGER NOT NULL DEFAULT 0
                            CHECK (delete_status BETWEEN 0 AND 3)
        );

        CREATE INDEX idx_messages_receiver ON messages(receiver_id, sent_at);
        CREATE INDEX idx_messages_sender ON messages(sender_id, sent_at);
";

pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        let tx = conn.transaction()?;
        tx.execute_batch(V1)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        run(&mut conn).unwrap();
        run(&mut conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn failed_migration_leaves_nothing_behind() {
        let mut conn = Connection::open_in_memory().unwrap();
        // clashes with the last table v1 creates
        conn.execute_batch("CREATE TABLE messages (id INTEGER);").unwrap();
        assert!(run(&mut conn).is_err());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 0);

        conn.execute_batch("DROP TABLE messages;").unwrap();
        run(&mut conn).unwrap();
        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(users, 0);
    }
}
