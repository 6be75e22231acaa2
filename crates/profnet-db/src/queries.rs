use crate::Database;
use crate::models::{
    ConnectionRow, EducationRow, MailboxRow, MessageRow, UserRow, WorkExperienceRow,
};
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "user_id, password, email, name, date_of_birth, created_at";
const MESSAGE_COLUMNS: &str =
    "id, sender_id, receiver_id, contents, sent_at, status, delete_status";
const CONNECTION_COLUMNS: &str = "id, requester_id, recipient_id, status, created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, user_id: &str, password_hash: &str, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (user_id, password, email) VALUES (?1, ?2, ?3)",
                (user_id, password_hash, email),
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, user_id))
    }

    pub fn user_exists(&self, user_id: &str) -> Result<bool> {
        Ok(self.count("SELECT 1 FROM users WHERE user_id = ?1", [user_id])? > 0)
    }

    /// Users whose login equals `keyword` or whose name contains it
    /// (case-insensitive), exact login matches first.
    pub fn search_users(&self, keyword: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE user_id = ?1 OR instr(lower(COALESCE(name, '')), lower(?1)) > 0
                 ORDER BY user_id <> ?1, user_id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([keyword], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_password(&self, user_id: &str, password_hash: &str) -> Result<usize> {
        self.execute(
            "UPDATE users SET password = ?1 WHERE user_id = ?2",
            (password_hash, user_id),
        )
    }

    pub fn update_email(&self, user_id: &str, email: &str) -> Result<usize> {
        self.execute("UPDATE users SET email = ?1 WHERE user_id = ?2", (email, user_id))
    }

    pub fn update_name(&self, user_id: &str, name: &str) -> Result<usize> {
        self.execute("UPDATE users SET name = ?1 WHERE user_id = ?2", (name, user_id))
    }

    pub fn update_date_of_birth(&self, user_id: &str, date_of_birth: &str) -> Result<usize> {
        self.execute(
            "UPDATE users SET date_of_birth = ?1 WHERE user_id = ?2",
            (date_of_birth, user_id),
        )
    }

    // -- Work / education --

    pub fn insert_work_experience(
        &self,
        user_id: &str,
        company: &str,
        role: &str,
        location: &str,
        start_date: &str,
        end_date: Option<&str>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO work_experience (user_id, company, role, location, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![user_id, company, role, location, start_date, end_date],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_work_experience(&self, user_id: &str) -> Result<Vec<WorkExperienceRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, company, role, location, start_date, end_date
                 FROM work_experience WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(WorkExperienceRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        company: row.get(2)?,
                        role: row.get(3)?,
                        location: row.get(4)?,
                        start_date: row.get(5)?,
                        end_date: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_education(
        &self,
        user_id: &str,
        institution: &str,
        major: &str,
        degree: &str,
        start_date: &str,
        end_date: Option<&str>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO education_details (user_id, institution, major, degree, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![user_id, institution, major, degree, start_date, end_date],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_education(&self, user_id: &str) -> Result<Vec<EducationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, institution, major, degree, start_date, end_date
                 FROM education_details WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(EducationRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        institution: row.get(2)?,
                        major: row.get(3)?,
                        degree: row.get(4)?,
                        start_date: row.get(5)?,
                        end_date: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Connections --

    pub fn insert_connection_request(&self, requester_id: &str, recipient_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO connections (requester_id, recipient_id, status) VALUES (?1, ?2, 'Request')",
                (requester_id, recipient_id),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Every edge between `a` and `b`, in either direction, oldest first.
    pub fn get_connections_between(&self, a: &str, b: &str) -> Result<Vec<ConnectionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CONNECTION_COLUMNS} FROM connections
                 WHERE (requester_id = ?1 AND recipient_id = ?2)
                    OR (requester_id = ?2 AND recipient_id = ?1)
                 ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([a, b], map_connection)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Users `user_id` has accepted edges with: outgoing edges first, then
    /// incoming, each in insertion order. Duplicates are left in.
    pub fn get_accepted_peers(&self, user_id: &str) -> Result<Vec<String>> {
        let mut peers = self.fetch_column(
            "SELECT recipient_id FROM connections
             WHERE requester_id = ?1 AND status = 'Accept' ORDER BY id",
            [user_id],
        )?;
        peers.extend(self.fetch_column(
            "SELECT requester_id FROM connections
             WHERE recipient_id = ?1 AND status = 'Accept' ORDER BY id",
            [user_id],
        )?);
        Ok(peers)
    }

    /// Requests waiting on `recipient_id`, oldest first.
    pub fn get_pending_requests(&self, recipient_id: &str) -> Result<Vec<ConnectionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {CONNECTION_COLUMNS} FROM connections
                 WHERE recipient_id = ?1 AND status = 'Request'
                 ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([recipient_id], map_connection)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Answer the pending request from `requester_id` to `recipient_id`.
    /// Only rows still in `Request` are touched; returns the number changed.
    pub fn answer_connection_request(
        &self,
        requester_id: &str,
        recipient_id: &str,
        status: &str,
    ) -> Result<usize> {
        self.execute(
            "UPDATE connections SET status = ?1
             WHERE requester_id = ?2 AND recipient_id = ?3 AND status = 'Request'",
            (status, requester_id, recipient_id),
        )
    }

    // -- Messages --

    /// Returns the store-assigned message id.
    pub fn insert_message(
        &self,
        sender_id: &str,
        receiver_id: &str,
        contents: &str,
        status: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (sender_id, receiver_id, contents, status, delete_status)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                (sender_id, receiver_id, contents, status),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    pub fn count_messages(&self) -> Result<usize> {
        self.count("SELECT id FROM messages", [])
    }

    /// Delivered or read messages addressed to `user_id` that the receiver
    /// has not deleted, oldest first.
    pub fn get_inbox(&self, user_id: &str) -> Result<Vec<MailboxRow>> {
        self.with_conn(|conn| {
            query_mailbox(
                conn,
                "SELECT id, sender_id, sent_at, status FROM messages
                 WHERE receiver_id = ?1
                   AND delete_status NOT IN (2, 3)
                   AND status IN ('Delivered', 'Read')
                 ORDER BY id",
                user_id,
            )
        })
    }

    /// Delivered or read messages sent by `user_id` that the sender has not
    /// deleted, oldest first.
    pub fn get_sent(&self, user_id: &str) -> Result<Vec<MailboxRow>> {
        self.with_conn(|conn| {
            query_mailbox(
                conn,
                "SELECT id, receiver_id, sent_at, status FROM messages
                 WHERE sender_id = ?1
                   AND delete_status NOT IN (1, 3)
                   AND status IN ('Delivered', 'Read')
                 ORDER BY id",
                user_id,
            )
        })
    }

    pub fn mark_message_read(&self, id: i64) -> Result<usize> {
        self.execute(
            "UPDATE messages SET status = 'Read' WHERE id = ?1 AND status = 'Delivered'",
            [id],
        )
    }

    /// Read the current delete flag, let `advance` compute the next one and
    /// store it, all inside one transaction. Returns the stored flag, or
    /// `None` when the message does not exist.
    pub fn update_delete_status<F>(&self, id: i64, advance: F) -> Result<Option<i64>>
    where
        F: FnOnce(&MessageRow) -> Result<i64>,
    {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(row) = query_message(&tx, id)? else {
                return Ok(None);
            };

            let next = advance(&row)?;
            if next != row.delete_status {
                tx.execute(
                    "UPDATE messages SET delete_status = ?1 WHERE id = ?2",
                    (next, id),
                )?;
            }
            tx.commit()?;
            Ok(Some(next))
        })
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        user_id: row.get(0)?,
        password: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        date_of_birth: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_connection(row: &Row<'_>) -> rusqlite::Result<ConnectionRow> {
    Ok(ConnectionRow {
        id: row.get(0)?,
        requester_id: row.get(1)?,
        recipient_id: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_user(conn: &Connection, user_id: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([user_id], map_user).optional()?;

    Ok(row)
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([id], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                sender_id: row.get(1)?,
                receiver_id: row.get(2)?,
                contents: row.get(3)?,
                sent_at: row.get(4)?,
                status: row.get(5)?,
                delete_status: row.get(6)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_mailbox(conn: &Connection, sql: &str, user_id: &str) -> Result<Vec<MailboxRow>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map([user_id], |row| {
            Ok(MailboxRow {
                id: row.get(0)?,
                counterpart: row.get(1)?,
                sent_at: row.get(2)?,
                status: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
