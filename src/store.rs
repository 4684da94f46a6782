// Copyright (c) The release-trends Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable snapshot storage and merge.
//!
//! One snapshot of cumulative download counts is merged per run, keyed by
//! `(repository, date, asset)`. Merging is a set union with new-row-wins, so
//! re-running the same day's ingestion corrects data rather than duplicating
//! it. The store performs no internal locking; callers must guarantee a
//! single writer per repository.

use camino::Utf8Path;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use thiserror::Error;

/// Columns every persisted snapshots table must carry. A table missing any
/// of these (e.g. from a format version change) is rejected, not patched.
const REQUIRED_COLUMNS: [&str; 4] = ["repository", "date", "asset", "download_count"];

#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted location cannot be read or written.
    #[error("storage unavailable")]
    Unavailable(#[from] rusqlite::Error),

    /// A previously persisted table has incompatible columns or data.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// One observed row of history: cumulative downloads for one asset on one
/// snapshot date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub date: NaiveDate,
    pub asset: String,
    pub download_count: u64,
}

#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the snapshot database at the given path.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_std_path())?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        // WAL persists in the database file; the rest are per-connection.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;
            PRAGMA temp_store = MEMORY;
            "#,
        )?;

        // Verify before creating: CREATE IF NOT EXISTS would silently accept
        // a stale table with different columns.
        verify_schema(&conn)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                repository TEXT NOT NULL,
                date TEXT NOT NULL,              -- ISO8601 date (YYYY-MM-DD)
                asset TEXT NOT NULL,
                download_count INTEGER NOT NULL,
                PRIMARY KEY (repository, date, asset)
            ) WITHOUT ROWID;
            "#,
        )?;

        Ok(Self { conn })
    }

    /// Merge one dated snapshot batch into a repository's history and return
    /// the full merged history, ordered by date ascending.
    ///
    /// All rows in a batch share the snapshot date. On a `(date, asset)` key
    /// collision the new row overwrites the old. The whole batch is written
    /// in one transaction, so a crash mid-merge leaves the prior history
    /// intact.
    pub fn merge(
        &mut self,
        repository: &str,
        date: NaiveDate,
        batch: &[(String, u64)],
    ) -> Result<Vec<Observation>, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO snapshots (repository, date, asset, download_count)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (asset, download_count) in batch {
                stmt.execute(params![
                    repository,
                    date.to_string(),
                    asset,
                    *download_count as i64
                ])?;
            }
        }
        tx.commit()?;

        self.history(repository)
    }

    /// Load a repository's full history, ordered by date ascending. Absent
    /// history (first run) is an empty vec, not an error.
    pub fn history(&self, repository: &str) -> Result<Vec<Observation>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, asset, download_count FROM snapshots
             WHERE repository = ?1
             ORDER BY date ASC, asset ASC",
        )?;

        let rows = stmt.query_map([repository], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (date_str, asset, download_count) = row?;
            let date = parse_stored_date(&date_str)?;
            // The store only ever writes non-negative counts; a negative
            // here is external corruption and must not be coerced away.
            let download_count = u64::try_from(download_count).map_err(|_| {
                StoreError::SchemaMismatch(format!(
                    "negative download_count {download_count} in snapshots table"
                ))
            })?;
            history.push(Observation {
                date,
                asset,
                download_count,
            });
        }
        Ok(history)
    }

    /// All repositories with persisted history, sorted.
    pub fn repositories(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT repository FROM snapshots ORDER BY repository")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The most recent snapshot date across all repositories, if any.
    pub fn latest_snapshot_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT MAX(date) FROM snapshots")?;
        let result: Option<String> = stmt.query_row([], |row| row.get(0))?;
        result.as_deref().map(parse_stored_date).transpose()
    }
}

fn parse_stored_date(date_str: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
        StoreError::SchemaMismatch(format!("unparseable date '{date_str}' in snapshots table"))
    })
}

fn verify_schema(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare("PRAGMA table_info(snapshots)")?;
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    // No table yet means a first run; it is created right after.
    if columns.is_empty() {
        return Ok(());
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.iter().any(|c| c == required))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::SchemaMismatch(format!(
            "snapshots table is missing required columns: {}",
            missing.join(", ")
        )))
    }
}
