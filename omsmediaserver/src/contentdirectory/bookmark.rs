//! Signets de reprise de lecture (action X_SetBookmark).

use std::path::Path;

use async_trait::async_trait;

/// Persistance des positions de reprise (collaborateur externe).
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Enregistre la position de reprise du fichier, en secondes.
    async fn set_bookmark(
        &self,
        file: &Path,
        position_seconds: u32,
        account_id: Option<&str>,
    ) -> omsstore::Result<()>;
}
