//! # omsstore
//!
//! Media store abstractions for the OMS media server.
//!
//! This crate provides the resource tree consumed by the ContentDirectory
//! service:
//!
//! - **Resource model**: [`StoreResource`], a closed Container/Item variant
//!   with per-renderer compatibility checks and DIDL-Lite rendering.
//! - **Store boundary**: the [`MediaStore`] trait, with an in-memory
//!   implementation ([`MemoryStore`]) used by tests and small deployments.
//! - **Renderer capabilities**: [`RendererProfile`], a plain capability
//!   struct passed by value into the browse/search algorithms.
//! - **Sorting**: the SortCriteria wire grammar and a stable multi-key
//!   sorter ([`sorter`]).
//!
//! # Thread Safety
//!
//! All store implementations must be `Send + Sync`: every Browse/Search
//! invocation runs as an independent task on the server's worker pool.

pub mod memory;
pub mod renderer;
pub mod resource;
pub mod sorter;
pub mod store;

pub use memory::MemoryStore;
pub use renderer::RendererProfile;
pub use resource::{Compatibility, StoreContainer, StoreItem, StoreResource, TranscodeEngine};
pub use sorter::{
    SortCriterion, SortKey, SortMethod, parse_sort_criteria, sort_resources,
    sort_resources_by_method,
};
pub use store::{LibraryFolder, MediaStore};

/// The well-known id of the tree root.
pub const ROOT_ID: &str = "0";

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid sort criterion: {0}")]
    InvalidSortCriterion(String),

    #[error("Browse error: {0}")]
    BrowseError(String),

    #[error("Playlist resolution failed: {0}")]
    PlaylistError(String),

    #[error(transparent)]
    Didl(#[from] omsdidl::DidlError),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
