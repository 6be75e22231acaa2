//! Untyped access to the store: run a statement, count rows, or pull a whole
//! result set back as text. Every value reaches SQLite through bound
//! parameters; callers never splice input into the SQL string.

use anyhow::Result;
use rusqlite::Params;
use rusqlite::types::ValueRef;
use tracing::debug;

use crate::Database;

/// One result row, each column rendered as text. SQL NULL is `None`.
pub type Record = Vec<Option<String>>;

impl Database {
    /// Run an INSERT/UPDATE/DELETE and return the number of affected rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        debug!(sql, "execute");
        self.with_conn(|conn| Ok(conn.execute(sql, params)?))
    }

    /// Number of rows the query yields.
    pub fn count<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        debug!(sql, "count");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query(params)?;
            let mut n = 0;
            while rows.next()?.is_some() {
                n += 1;
            }
            Ok(n)
        })
    }

    /// Full result set, in the order the store returns it.
    pub fn fetch_rows<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Record>> {
        debug!(sql, "fetch_rows");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns = stmt.column_count();

            let rows = stmt
                .query_map(params, |row| {
                    (0..columns)
                        .map(|i| row.get_ref(i).map(render))
                        .collect::<rusqlite::Result<Record>>()
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// First column of every row; NULLs are skipped.
    pub fn fetch_column<P: Params>(&self, sql: &str, params: P) -> Result<Vec<String>> {
        let rows = self.fetch_rows(sql, params)?;
        Ok(rows
            .into_iter()
            .filter_map(|record| record.into_iter().next().flatten())
            .collect())
    }
}

fn render(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(hex::encode(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.execute(
            "CREATE TABLE scratch (k TEXT, n INTEGER, r REAL, b BLOB, z TEXT)",
            [],
        )
        .unwrap();
        db
    }

    #[test]
    fn fetch_rows_renders_every_column_as_text() {
        let db = scratch();
        db.execute(
            "INSERT INTO scratch (k, n, r, b, z) VALUES (?1, ?2, ?3, ?4, NULL)",
            rusqlite::params!["a", 7, 1.5, vec![0xde_u8, 0xad]],
        )
        .unwrap();

        let rows = db.fetch_rows("SELECT k, n, r, b, z FROM scratch", []).unwrap();
        assert_eq!(
            rows,
            vec![vec![
                Some("a".to_string()),
                Some("7".to_string()),
                Some("1.5".to_string()),
                Some("dead".to_string()),
                None,
            ]]
        );
    }

    #[test]
    fn count_and_execute_report_rows() {
        let db = scratch();
        for k in ["x", "y", "y"] {
            db.execute("INSERT INTO scratch (k) VALUES (?1)", [k]).unwrap();
        }

        assert_eq!(db.count("SELECT * FROM scratch WHERE k = ?1", ["y"]).unwrap(), 2);
        assert_eq!(db.count("SELECT * FROM scratch WHERE k = ?1", ["q"]).unwrap(), 0);
        assert_eq!(
            db.execute("UPDATE scratch SET n = 1 WHERE k = ?1", ["y"]).unwrap(),
            2
        );
    }

    #[test]
    fn bound_parameters_are_not_interpreted_as_sql() {
        let db = scratch();
        db.execute("INSERT INTO scratch (k) VALUES (?1)", ["safe"]).unwrap();

        let hostile = "' OR '1'='1";
        assert_eq!(
            db.count("SELECT * FROM scratch WHERE k = ?1", [hostile]).unwrap(),
            0
        );
    }

    #[test]
    fn errors_surface_to_the_caller() {
        let db = scratch();
        assert!(db.fetch_rows("SELECT nope FROM scratch", []).is_err());
        assert!(db.execute("INSERT INTO missing VALUES (1)", []).is_err());
        // the connection is still usable afterwards
        assert_eq!(db.count("SELECT * FROM scratch", []).unwrap(), 0);
    }
}
