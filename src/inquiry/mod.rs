//! The inquiry pipeline: compose a message, pick an admin, build the link.
//!
//! [`InquiryService`] is the only place that couples the three collaborators.
//! Composition runs first so an unknown property fails the call before a
//! rotation slot is consumed; the target list is fetched fresh from the
//! directory on every call.

pub mod composer;
pub mod link;

use sqlx::SqlitePool;
use tracing::{debug, info};
use url::Url;

use crate::directory::{self, DirectoryError};
use crate::listings::{self, ListingsError};
use crate::rotator::store::CursorStore;
use crate::rotator::{RotatorError, RoundRobinSelector, Target};

/// Errors from the inquiry pipeline.
#[derive(Debug, thiserror::Error)]
pub enum InquiryError {
    /// The listing behind the inquiry does not exist or the store failed.
    #[error(transparent)]
    Listings(#[from] ListingsError),

    /// The contact directory could not be read.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Selection failed (empty list, contention, or cursor persistence).
    #[error(transparent)]
    Rotator(#[from] RotatorError),

    /// The configured WhatsApp send base URL is malformed.
    #[error("invalid send base URL: {0}")]
    SendBase(#[from] url::ParseError),
}

/// One generated inquiry link and the admin it was routed to.
#[derive(Debug, Clone)]
pub struct GeneratedLink {
    /// The full WhatsApp deep link.
    pub url: Url,
    /// The target that absorbed this rotation slot.
    pub target: Target,
}

/// Couples the composer, the contact directory, and the rotator.
pub struct InquiryService<S> {
    db: SqlitePool,
    selector: RoundRobinSelector<S>,
    site_base: String,
    send_base: String,
}

impl<S: CursorStore> InquiryService<S> {
    /// Create a service over the shared database and a selector.
    ///
    /// `site_base` is the public site root embedded in composed messages;
    /// `send_base` is the WhatsApp send endpoint.
    pub fn new(
        db: SqlitePool,
        selector: RoundRobinSelector<S>,
        site_base: impl Into<String>,
        send_base: impl Into<String>,
    ) -> Self {
        Self {
            db,
            selector,
            site_base: site_base.into(),
            send_base: send_base.into(),
        }
    }

    /// Compose the inquiry text for a listing without consuming a rotation
    /// slot (the old `chat-show` operation).
    ///
    /// # Errors
    ///
    /// Returns [`InquiryError::Listings`] when the property is unknown.
    pub async fn chat_preview(&self, property_id: i64) -> Result<String, InquiryError> {
        let details = listings::load_property_details(&self.db, property_id).await?;
        Ok(composer::compose_inquiry(&self.site_base, &details))
    }

    /// Generate a WhatsApp inquiry link for a listing.
    ///
    /// Composes the message, fetches the current admin list, selects the
    /// next admin in rotation, and builds the deep link. The cursor only
    /// advances when every earlier step has succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`InquiryError::Listings`] for an unknown property,
    /// [`InquiryError::Rotator`] when the list is empty or the cursor store
    /// fails, and [`InquiryError::Directory`] when the list cannot be read.
    pub async fn generate_link(&self, property_id: i64) -> Result<GeneratedLink, InquiryError> {
        let details = listings::load_property_details(&self.db, property_id).await?;
        let text = composer::compose_inquiry(&self.site_base, &details);

        let targets = directory::contact_targets(&self.db).await?;
        debug!(property_id, targets = targets.len(), "selecting inquiry target");
        let target = self.selector.select_next(&targets).await?;

        let url = link::build_send_link(&self.send_base, &target.handle, &text)?;
        info!(property_id, admin_id = ?target.id, "inquiry link generated");
        Ok(GeneratedLink { url, target })
    }

    /// Reset the rotation cursor to the start of the list.
    ///
    /// # Errors
    ///
    /// Returns [`InquiryError::Rotator`] when the cursor store fails.
    pub async fn reset_cursor(&self) -> Result<(), InquiryError> {
        self.selector.reset().await?;
        Ok(())
    }
}
