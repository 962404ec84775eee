//! Forward-only migration engine.
//!
//! Discovers `.sql` files in a [`MigrationSource`], applies the pending ones
//! in lexicographic name order, and checkpoints each success into a
//! `migration_log` table in the same database, so that re-running the engine
//! is idempotent. There are no down-migrations; recovery from a bad file is
//! a fixed file and another run.

use std::collections::HashSet;
use std::io;

use chrono::NaiveDateTime;
use sqlx::sqlite::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use super::source::MigrationSource;

/// One row of the `migration_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub path: String,
    pub created_at: NaiveDateTime,
}

/// Why a migration run failed.
#[derive(Debug, Error)]
pub enum MigrateErrorKind {
    #[error("error walking migration source: {0}")]
    Discovery(#[source] io::Error),

    #[error("error ensuring migration log: {0}")]
    EnsureLog(#[source] sqlx::Error),

    #[error("error reading migration log: {0}")]
    ReadLog(#[source] sqlx::Error),

    #[error("error reading migration '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("error applying migration '{path}': {source}")]
    Execute {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("error checkpointing migration '{path}': {source}")]
    Checkpoint {
        path: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Error from a migration run.
///
/// `applied` holds the migrations this run checkpointed before the failure,
/// so callers can observe partial progress. A `Checkpoint` failure means the
/// offending migration already took effect on the schema but was not logged;
/// the next run will execute it again, which is why migration files are
/// expected to use `IF NOT EXISTS`-style statements.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct MigrateError {
    pub applied: Vec<String>,
    pub kind: MigrateErrorKind,
}

impl MigrateError {
    fn new(kind: MigrateErrorKind) -> Self {
        Self {
            applied: Vec::new(),
            kind,
        }
    }

    fn partial(applied: Vec<String>, kind: MigrateErrorKind) -> Self {
        Self { applied, kind }
    }
}

/// Applies pending migrations against one database.
///
/// Single-runner: nothing here guards against a second process migrating
/// the same database concurrently.
pub struct Migrator {
    pool: SqlitePool,
}

impl Migrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations from `source`.
    ///
    /// Returns the names applied by this run, in application order. An empty
    /// list means nothing was pending, which is success. On failure the
    /// error carries the names applied before the failing file, and no later
    /// file has been attempted.
    pub async fn run(&self, source: &dyn MigrationSource) -> Result<Vec<String>, MigrateError> {
        let candidates =
            discover(source).map_err(|e| MigrateError::new(MigrateErrorKind::Discovery(e)))?;

        // The log table has to exist before anything can be checkpointed.
        self.ensure_log()
            .await
            .map_err(|e| MigrateError::new(MigrateErrorKind::EnsureLog(e)))?;

        let existing: HashSet<String> = self
            .applied_migrations()
            .await
            .map_err(|e| MigrateError::new(MigrateErrorKind::ReadLog(e)))?
            .into_iter()
            .collect();
        debug!(logged = existing.len(), "loaded migration log");

        let mut applied = Vec::new();
        for path in candidates {
            if existing.contains(&path) {
                continue;
            }

            let content = match source.read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    return Err(MigrateError::partial(
                        applied,
                        MigrateErrorKind::Read { path, source: e },
                    ))
                }
            };

            // The whole file runs as one opaque batch; the engine never
            // parses or splits the SQL.
            info!(migration = %path, "applying migration");
            let sql = String::from_utf8_lossy(&content);
            if let Err(e) = sqlx::raw_sql(&sql).execute(&self.pool).await {
                return Err(MigrateError::partial(
                    applied,
                    MigrateErrorKind::Execute { path, source: e },
                ));
            }

            if let Err(e) = self.checkpoint(&path).await {
                return Err(MigrateError::partial(
                    applied,
                    MigrateErrorKind::Checkpoint { path, source: e },
                ));
            }

            applied.push(path);
        }

        Ok(applied)
    }

    /// Create the `migration_log` table if it does not exist.
    ///
    /// Safe to call on every startup, against both a fresh database and one
    /// that already holds log entries.
    pub async fn ensure_log(&self) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS migration_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Paths currently in the migration log, in application order (by log id).
    pub async fn applied_migrations(&self) -> sqlx::Result<Vec<String>> {
        let entries: Vec<LogEntry> =
            sqlx::query_as("SELECT id, path, created_at FROM migration_log ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(entries.into_iter().map(|e| e.path).collect())
    }

    /// Record one migration as applied. Called only after its SQL succeeded.
    async fn checkpoint(&self, path: &str) -> sqlx::Result<()> {
        sqlx::query("INSERT INTO migration_log (path) VALUES (?)")
            .bind(path)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Enumerate candidate migrations: leaf entries whose name ends in `.sql`,
/// sorted bytewise ascending. Everything else in the source is ignored.
fn discover(source: &dyn MigrationSource) -> io::Result<Vec<String>> {
    let mut candidates: Vec<String> = source
        .entries()?
        .into_iter()
        .filter(|name| name.ends_with(".sql"))
        .collect();
    candidates.sort();
    Ok(candidates)
}
