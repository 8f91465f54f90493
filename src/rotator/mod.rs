//! Round-robin selection over the admin contact list.
//!
//! The selector keeps a single durable cursor (the next index to serve) in an
//! injected [`CursorStore`] and advances it once per successful call. The
//! list itself is supplied fresh on every call — admins add and remove
//! numbers between calls, so the cursor is always interpreted modulo the
//! current length.
//!
//! The read-modify-write runs as a compare-and-swap loop rather than a plain
//! read-then-write: two simultaneous callers must never advance from the same
//! base, or one number gets skipped and another doubled up.

pub mod store;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use self::store::{CursorStore, CursorStoreError};

/// One contact handle eligible for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Database ID of the admin number, when it has one.
    pub id: Option<i64>,
    /// Phone number in international digits form (e.g. `6281357477967`).
    pub handle: String,
}

impl Target {
    /// Build a target from a bare handle (no database identity).
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            id: None,
            handle: handle.into(),
        }
    }
}

/// Errors from a selection call.
#[derive(Debug, thiserror::Error)]
pub enum RotatorError {
    /// The supplied target list was empty. No state was touched.
    #[error("no contact numbers available")]
    NoTargetsAvailable,

    /// The cursor store failed. The persisted cursor is unchanged, so the
    /// whole selection may simply be retried.
    #[error("rotation state unavailable: {0}")]
    PersistenceUnavailable(#[from] CursorStoreError),

    /// The compare-and-swap loop lost every attempt. Only reachable when the
    /// store is livelocked by other writers; the cursor is unchanged.
    #[error("rotation state contended, gave up after {attempts} attempts")]
    Contended {
        /// Number of swap attempts made before giving up.
        attempts: u32,
    },
}

/// Upper bound on swap attempts per call. Each lost attempt means another
/// caller advanced the cursor, so progress is system-wide even when one
/// caller exhausts its budget.
const MAX_SWAP_ATTEMPTS: u32 = 64;

/// Fair selector over an externally owned target list.
///
/// Holds no cursor state of its own beyond the duration of one call; every
/// call re-reads the store, so selector instances in separate processes that
/// share a store (the database backend) agree on one cursor.
pub struct RoundRobinSelector<S> {
    store: S,
}

impl<S: CursorStore> RoundRobinSelector<S> {
    /// Create a selector over the given cursor store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Select the next target and durably advance the cursor.
    ///
    /// The cursor is read, reduced modulo `targets.len()` (the list may have
    /// shrunk since the last write), and swapped to `effective + 1` mod len.
    /// A lost swap means a concurrent caller won; the loop re-reads and
    /// tries again from the fresh cursor.
    ///
    /// Exactly one durable write happens per successful call. A failed call
    /// leaves the stored cursor byte-for-byte unchanged.
    ///
    /// # Errors
    ///
    /// [`RotatorError::NoTargetsAvailable`] for an empty list,
    /// [`RotatorError::PersistenceUnavailable`] when the store fails, and
    /// [`RotatorError::Contended`] if every swap attempt loses.
    pub async fn select_next(&self, targets: &[Target]) -> Result<Target, RotatorError> {
        if targets.is_empty() {
            return Err(RotatorError::NoTargetsAvailable);
        }
        let len = targets.len() as u64;

        for attempt in 0..MAX_SWAP_ATTEMPTS {
            let current = self.store.load().await?;
            let effective = current.unwrap_or(0) % len;
            let next = (effective + 1) % len;

            if self.store.compare_and_swap(current, next).await? {
                trace!(index = effective, of = len, "target selected");
                // effective < len <= usize::MAX on all supported targets
                return Ok(targets[usize::try_from(effective).unwrap_or(0)].clone());
            }
            trace!(attempt, "cursor swap lost, retrying");
        }

        warn!(attempts = MAX_SWAP_ATTEMPTS, "cursor swap budget exhausted");
        Err(RotatorError::Contended {
            attempts: MAX_SWAP_ATTEMPTS,
        })
    }

    /// Reset the cursor so the next selection starts from index 0.
    ///
    /// # Errors
    ///
    /// Returns [`RotatorError::PersistenceUnavailable`] when the store fails.
    pub async fn reset(&self) -> Result<(), RotatorError> {
        self.store.reset().await?;
        Ok(())
    }
}
