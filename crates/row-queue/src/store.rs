//! SQLite-backed record store for the polling queue engine.
//!
//! One row per enqueued message. All timestamps are unix milliseconds so
//! that eligibility comparisons happen inside the store. Acknowledged rows
//! are soft-deleted via `deleted_at`; every scan and lookup excludes them.

use crate::error::QueueError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, Transaction};

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

/// A persisted queue record
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct QueueRecord {
    pub id: i64,
    pub body: String,
    pub queue_name: String,
    pub receive_count: i64,
    pub delete_tag: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS queue_records (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    body          TEXT NOT NULL,
    queue_name    TEXT NOT NULL,
    receive_count INTEGER NOT NULL DEFAULT 0,
    delete_tag    TEXT NOT NULL,
    created_at    INTEGER NOT NULL,
    updated_at    INTEGER NOT NULL,
    deleted_at    INTEGER
)";

// Body uniqueness is scoped per queue and only among live rows, so an
// acknowledged message does not block a later resend of the same content.
const CREATE_INDEXES: [&str; 3] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_queue_records_queue_body
        ON queue_records (queue_name, body) WHERE deleted_at IS NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_queue_records_delete_tag
        ON queue_records (delete_tag)",
    "CREATE INDEX IF NOT EXISTS idx_queue_records_queue_name
        ON queue_records (queue_name)",
];

const CLAIM_AVAILABLE: &str = "\
UPDATE queue_records
SET receive_count = receive_count + 1, updated_at = ?1
WHERE delete_tag IN (
    SELECT delete_tag FROM queue_records
    WHERE queue_name = ?2
      AND deleted_at IS NULL
      AND receive_count < ?3
      AND updated_at <= ?4
    ORDER BY updated_at ASC
    LIMIT ?5
)
RETURNING id, body, queue_name, receive_count, delete_tag, created_at, updated_at, deleted_at";

/// Handle to the shared queue table
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Open (creating if necessary) the database at `path` and ensure the
    /// queue table exists.
    pub async fn open(path: &str) -> Result<Self, QueueError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Begin a store transaction; dropping it without commit rolls back
    pub async fn begin(&self) -> Result<Transaction<'_, Sqlite>, QueueError> {
        Ok(self.pool.begin().await?)
    }

    async fn ensure_schema(&self) -> Result<(), QueueError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        for statement in CREATE_INDEXES {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a fresh record, failing with DuplicateMessage when the body
    /// already exists live on the same queue.
    pub async fn insert(
        conn: &mut SqliteConnection,
        queue_name: &str,
        body: &str,
        delete_tag: &str,
        now_ms: i64,
    ) -> Result<(), QueueError> {
        let result = sqlx::query(
            "INSERT INTO queue_records \
             (body, queue_name, receive_count, delete_tag, created_at, updated_at) \
             VALUES (?1, ?2, 0, ?3, ?4, ?4)",
        )
        .bind(body)
        .bind(queue_name)
        .bind(delete_tag)
        .bind(now_ms)
        .execute(conn)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(QueueError::DuplicateMessage {
                    queue: queue_name.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Atomically claim up to `limit` available records for a queue.
    ///
    /// Available means live, under the receive-count ceiling, and last
    /// updated at or before `cutoff_ms`. Claims oldest-updated first,
    /// advancing `receive_count` and refreshing `updated_at` to `now_ms`
    /// for exactly the claimed rows. The guarded update makes the scan and
    /// increment one statement, so two concurrent claimers can never both
    /// take the same row for the same delivery window.
    pub async fn claim_available(
        conn: &mut SqliteConnection,
        queue_name: &str,
        max_receive_count: u32,
        cutoff_ms: i64,
        now_ms: i64,
        limit: u32,
    ) -> Result<Vec<QueueRecord>, QueueError> {
        let claimed = sqlx::query_as::<_, QueueRecord>(CLAIM_AVAILABLE)
            .bind(now_ms)
            .bind(queue_name)
            .bind(i64::from(max_receive_count))
            .bind(cutoff_ms)
            .bind(i64::from(limit))
            .fetch_all(conn)
            .await?;
        Ok(claimed)
    }

    /// Look up a single live record by its delete tag
    pub async fn find_by_delete_tag(
        conn: &mut SqliteConnection,
        delete_tag: &str,
    ) -> Result<Option<QueueRecord>, QueueError> {
        let record = sqlx::query_as::<_, QueueRecord>(
            "SELECT id, body, queue_name, receive_count, delete_tag, \
                    created_at, updated_at, deleted_at \
             FROM queue_records WHERE delete_tag = ?1 AND deleted_at IS NULL",
        )
        .bind(delete_tag)
        .fetch_optional(conn)
        .await?;
        Ok(record)
    }

    /// Logically delete a live record by its delete tag
    pub async fn mark_deleted(
        conn: &mut SqliteConnection,
        delete_tag: &str,
        now_ms: i64,
    ) -> Result<(), QueueError> {
        let result = sqlx::query(
            "UPDATE queue_records SET deleted_at = ?2 \
             WHERE delete_tag = ?1 AND deleted_at IS NULL",
        )
        .bind(delete_tag)
        .bind(now_ms)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(QueueError::NotFound {
                delete_tag: delete_tag.to_string(),
            });
        }
        Ok(())
    }
}
