//! Durable cursor storage behind the [`CursorStore`] seam.
//!
//! Three backends: a counter file (the shape the admin tooling historically
//! inspected by hand), a row in the main SQLite database (safe across
//! processes), and an in-memory store for tests and dry runs.
//!
//! A corrupt persisted value is recovered as absent — the rotation restarts
//! from index 0 with a warning rather than failing the inquiry. Fairness
//! degrades for one cycle; availability wins.

use std::path::PathBuf;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::warn;

/// Errors from cursor persistence.
#[derive(Debug, thiserror::Error)]
pub enum CursorStoreError {
    /// Counter file could not be read or replaced.
    #[error("cursor file i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[error("cursor database: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable storage for the rotation cursor.
///
/// `compare_and_swap` is the only mutation the selector performs; it must be
/// all-or-nothing so a failed call leaves the stored value untouched.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Read the persisted cursor. `None` when absent or unreadable.
    async fn load(&self) -> Result<Option<u64>, CursorStoreError>;

    /// Atomically replace the cursor with `next`, but only if it still reads
    /// as `expected`. Returns `false` when another writer got there first.
    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, CursorStoreError>;

    /// Remove the cursor entirely (explicit admin reset).
    async fn reset(&self) -> Result<(), CursorStoreError>;
}

// ── File backend ────────────────────────────────────────────────

/// Cursor in a dedicated counter file holding one decimal integer.
///
/// Writes go through a temp file and rename, so a crashed write never leaves
/// a half-updated value. The compare half of the swap is serialized by an
/// internal mutex, which makes this backend single-process only; deployments
/// running several instances should use [`SqliteCursorStore`].
pub struct FileCursorStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCursorStore {
    /// Create a store over the given counter file. The file is created
    /// lazily on the first successful swap.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Read and parse the current value. Absent file and garbage both map to
    /// `None`; garbage is logged.
    fn read_current(&self) -> Result<Option<u64>, CursorStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match raw.trim().parse::<u64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                warn!(path = %self.path.display(), "cursor file unreadable, treating as 0");
                Ok(None)
            }
        }
    }

    /// Replace the file contents atomically via temp file + rename.
    fn replace(&self, value: u64) -> Result<(), CursorStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, value.to_string())?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl CursorStore for FileCursorStore {
    async fn load(&self) -> Result<Option<u64>, CursorStoreError> {
        let _guard = self.lock.lock().await;
        self.read_current()
    }

    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, CursorStoreError> {
        let _guard = self.lock.lock().await;
        if self.read_current()? != expected {
            return Ok(false);
        }
        self.replace(next)?;
        Ok(true)
    }

    async fn reset(&self) -> Result<(), CursorStoreError> {
        let _guard = self.lock.lock().await;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── SQLite backend ──────────────────────────────────────────────

/// Key under which the admin rotation cursor is stored.
pub const ROTATION_KEY: &str = "admin_rotation";

/// Cursor in the `rotation_state` table of the main database.
///
/// Both halves of the swap are single conditional statements, so selector
/// instances in separate processes sharing the database file cannot lose
/// updates to each other.
pub struct SqliteCursorStore {
    db: SqlitePool,
    key: String,
}

impl SqliteCursorStore {
    /// Create a store over the shared pool using the default key.
    pub fn new(db: SqlitePool) -> Self {
        Self::with_key(db, ROTATION_KEY)
    }

    /// Create a store with an explicit state key (one per rotation pool).
    pub fn with_key(db: SqlitePool, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }
}

#[async_trait]
impl CursorStore for SqliteCursorStore {
    async fn load(&self) -> Result<Option<u64>, CursorStoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT cursor FROM rotation_state WHERE key = ?1")
                .bind(&self.key)
                .fetch_optional(&self.db)
                .await?;
        match row {
            Some((v,)) => match u64::try_from(v) {
                Ok(v) => Ok(Some(v)),
                Err(_) => {
                    warn!(key = %self.key, value = v, "negative cursor in database, treating as 0");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, CursorStoreError> {
        let next_i64 = i64::try_from(next).unwrap_or(0);
        let result = match expected {
            Some(expected) => {
                sqlx::query("UPDATE rotation_state SET cursor = ?1 WHERE key = ?2 AND cursor = ?3")
                    .bind(next_i64)
                    .bind(&self.key)
                    .bind(i64::try_from(expected).unwrap_or(-1))
                    .execute(&self.db)
                    .await?
            }
            None => {
                // Also covers the corrupt (negative) case reported as None.
                sqlx::query(
                    "INSERT INTO rotation_state (key, cursor) VALUES (?1, ?2) \
                     ON CONFLICT(key) DO UPDATE SET cursor = ?2 WHERE rotation_state.cursor < 0",
                )
                .bind(&self.key)
                .bind(next_i64)
                .execute(&self.db)
                .await?
            }
        };
        Ok(result.rows_affected() == 1)
    }

    async fn reset(&self) -> Result<(), CursorStoreError> {
        sqlx::query("DELETE FROM rotation_state WHERE key = ?1")
            .bind(&self.key)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<S: CursorStore + ?Sized> CursorStore for Box<S> {
    async fn load(&self) -> Result<Option<u64>, CursorStoreError> {
        (**self).load().await
    }

    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, CursorStoreError> {
        (**self).compare_and_swap(expected, next).await
    }

    async fn reset(&self) -> Result<(), CursorStoreError> {
        (**self).reset().await
    }
}

#[async_trait]
impl<S: CursorStore + ?Sized> CursorStore for std::sync::Arc<S> {
    async fn load(&self) -> Result<Option<u64>, CursorStoreError> {
        (**self).load().await
    }

    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, CursorStoreError> {
        (**self).compare_and_swap(expected, next).await
    }

    async fn reset(&self) -> Result<(), CursorStoreError> {
        (**self).reset().await
    }
}

// ── In-memory backend ───────────────────────────────────────────

/// In-memory cursor for tests and dry runs. Not durable.
#[derive(Default)]
pub struct MemoryCursorStore {
    cursor: StdMutex<Option<u64>>,
}

impl MemoryCursorStore {
    /// Create an empty store (no cursor yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a cursor value.
    pub fn with_cursor(value: u64) -> Self {
        Self {
            cursor: StdMutex::new(Some(value)),
        }
    }

    /// Current value, for test assertions.
    pub fn snapshot(&self) -> Option<u64> {
        *self.cursor.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn load(&self) -> Result<Option<u64>, CursorStoreError> {
        Ok(self.snapshot())
    }

    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, CursorStoreError> {
        let mut guard = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        if *guard != expected {
            return Ok(false);
        }
        *guard = Some(next);
        Ok(true)
    }

    async fn reset(&self) -> Result<(), CursorStoreError> {
        *self.cursor.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
