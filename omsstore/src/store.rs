//! The media store boundary.
//!
//! The tree itself is owned by the scanner/persistence side of the server;
//! the ContentDirectory core only reads it through this trait. One call's
//! result is a consistent snapshot; no guarantee is made across successive
//! calls if the tree mutates in between (callers detect drift through the
//! SystemUpdateID they get back with every result).

use async_trait::async_trait;

use crate::Result;
use crate::resource::StoreResource;

/// Well-known virtual library views addressed by legacy flattened-menu
/// renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryFolder {
    Albums,
    Artists,
    Genres,
    Playlists,
    All,
}

/// Read access to the hierarchical media tree.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Looks up a single resource by id.
    async fn get_resource(&self, object_id: &str) -> Option<StoreResource>;

    /// Returns the candidate list for a browse: the direct children of
    /// `object_id`, or the resolved node itself when `direct_children` is
    /// false. `None` means the id resolves to nothing browsable.
    async fn get_resources(
        &self,
        object_id: &str,
        direct_children: bool,
    ) -> Option<Vec<StoreResource>> {
        self.get_resources_hinted(object_id, direct_children, 0, 0, None)
            .await
    }

    /// Variant carrying the caller's pagination window and search string.
    ///
    /// `start`/`count` are discovery hints: a lazily materializing store
    /// uses them to decide how much of the container to analyze, but the
    /// returned list is never windowed here (the coordinator paginates).
    /// `search_criteria` lets a store pre-filter children when it can do so
    /// cheaply; the coordinator re-filters client-side regardless.
    async fn get_resources_hinted(
        &self,
        object_id: &str,
        direct_children: bool,
        start: u32,
        count: u32,
        search_criteria: Option<&str>,
    ) -> Option<Vec<StoreResource>>;

    /// Re-materializes a playlist-type container from its backing source.
    async fn resolve_playlist(&self, object_id: &str) -> Result<()>;

    /// Resolves a well-known virtual library view to its container id.
    async fn library_folder(&self, folder: LibraryFolder) -> Option<String>;
}
