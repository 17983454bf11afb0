//! In-memory media store.
//!
//! A fully materialized tree backed by a hash map, used by the test suite
//! and by small deployments where the whole library fits in memory. Because
//! everything is already materialized, the discovery hints of
//! [`MediaStore::get_resources_hinted`] are ignored.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::SystemTime;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::resource::{StoreContainer, StoreResource};
use crate::store::{LibraryFolder, MediaStore};
use crate::{ROOT_ID, Result, StoreError};

/// Hash-map backed implementation of [`MediaStore`].
pub struct MemoryStore {
    nodes: RwLock<HashMap<String, StoreResource>>,
    library_folders: RwLock<HashMap<LibraryFolder, String>>,
}

impl MemoryStore {
    /// Creates a store holding only the root container.
    pub fn new(root_title: impl Into<String>) -> Self {
        let mut nodes = HashMap::new();
        let mut root = StoreContainer::new(ROOT_ID, None, root_title);
        root.class = "object.container".to_string();
        nodes.insert(ROOT_ID.to_string(), StoreResource::Container(root));
        Self {
            nodes: RwLock::new(nodes),
            library_folders: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a resource and links it into its parent's child list.
    ///
    /// Re-inserting an existing id replaces the node in place without
    /// duplicating the parent link.
    pub fn insert(&self, resource: StoreResource) {
        let mut nodes = self.nodes.write().unwrap();
        let id = resource.id().to_string();
        let parent_id = resource.parent_id().map(str::to_string);
        let replaced = nodes.insert(id.clone(), resource).is_some();

        if replaced {
            return;
        }
        if let Some(parent_id) = parent_id {
            match nodes.get_mut(&parent_id) {
                Some(StoreResource::Container(parent)) => parent.children.push(id),
                _ => warn!(id = %id, parent = %parent_id, "Inserted resource has no parent container"),
            }
        }
    }

    /// Removes a resource and its parent link. Children of a removed
    /// container become unreachable but are not garbage collected.
    pub fn remove(&self, object_id: &str) -> Option<StoreResource> {
        let mut nodes = self.nodes.write().unwrap();
        let removed = nodes.remove(object_id)?;
        if let Some(parent_id) = removed.parent_id().map(str::to_string)
            && let Some(StoreResource::Container(parent)) = nodes.get_mut(&parent_id)
        {
            parent.children.retain(|c| c != object_id);
        }
        Some(removed)
    }

    /// Registers the container backing a well-known virtual library view.
    pub fn set_library_folder(&self, folder: LibraryFolder, object_id: impl Into<String>) {
        self.library_folders
            .write()
            .unwrap()
            .insert(folder, object_id.into());
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn get_resource(&self, object_id: &str) -> Option<StoreResource> {
        self.nodes.read().unwrap().get(object_id).cloned()
    }

    async fn get_resources_hinted(
        &self,
        object_id: &str,
        direct_children: bool,
        _start: u32,
        _count: u32,
        search_criteria: Option<&str>,
    ) -> Option<Vec<StoreResource>> {
        let nodes = self.nodes.read().unwrap();
        let node = nodes.get(object_id)?;

        if !direct_children {
            return Some(vec![node.clone()]);
        }

        let container = node.as_container()?;
        let mut children: Vec<StoreResource> = container
            .children
            .iter()
            .filter_map(|child_id| nodes.get(child_id).cloned())
            .collect();

        if let Some(search) = search_criteria {
            let needle = search.to_lowercase();
            children.retain(|c| c.title().to_lowercase().contains(&needle));
        }

        Some(children)
    }

    async fn resolve_playlist(&self, object_id: &str) -> Result<()> {
        // The lock must not be held across the stat below.
        let path = {
            let nodes = self.nodes.read().unwrap();
            let node = nodes
                .get(object_id)
                .ok_or_else(|| StoreError::ObjectNotFound(object_id.to_string()))?;
            let StoreResource::Container(container) = node else {
                return Err(StoreError::PlaylistError(format!(
                    "{object_id} is not a container"
                )));
            };
            let Some(path) = &container.playlist_source else {
                return Err(StoreError::PlaylistError(format!(
                    "{object_id} has no backing playlist"
                )));
            };
            path.clone()
        };

        // Read-through refresh: take the backing file's mtime as the new
        // materialization timestamp so the next browse sees it fresh.
        let modified = tokio::fs::metadata(&path)
            .await
            .and_then(|m| m.modified())
            .map_err(|e| StoreError::PlaylistError(e.to_string()))?;

        let mut nodes = self.nodes.write().unwrap();
        if let Some(StoreResource::Container(container)) = nodes.get_mut(object_id) {
            container.last_modified = modified.max(SystemTime::now());
        }
        debug!(object_id = %object_id, "Re-materialized playlist container");
        Ok(())
    }

    async fn library_folder(&self, folder: LibraryFolder) -> Option<String> {
        self.library_folders.read().unwrap().get(&folder).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::StoreItem;

    fn store_with_items(n: usize) -> MemoryStore {
        let store = MemoryStore::new("Test Library");
        for i in 0..n {
            store.insert(StoreResource::Item(StoreItem::new(
                format!("item-{i:02}"),
                Some(ROOT_ID),
                format!("item-{i:02}"),
            )));
        }
        store
    }

    #[tokio::test]
    async fn test_root_exists() {
        let store = MemoryStore::new("Test Library");
        let root = store.get_resource(ROOT_ID).await.unwrap();
        assert!(root.is_container());
        assert_eq!(root.title(), "Test Library");
    }

    #[tokio::test]
    async fn test_children_keep_insertion_order() {
        let store = store_with_items(5);
        let children = store.get_resources(ROOT_ID, true).await.unwrap();
        let ids: Vec<&str> = children.iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            vec!["item-00", "item-01", "item-02", "item-03", "item-04"]
        );
    }

    #[tokio::test]
    async fn test_metadata_mode_returns_single_node() {
        let store = store_with_items(3);
        let result = store.get_resources("item-01", false).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), "item-01");
    }

    #[tokio::test]
    async fn test_unknown_id_yields_none() {
        let store = store_with_items(1);
        assert!(store.get_resources("missing-id", true).await.is_none());
    }

    #[tokio::test]
    async fn test_children_of_item_yields_none() {
        let store = store_with_items(1);
        assert!(store.get_resources("item-00", true).await.is_none());
    }

    #[tokio::test]
    async fn test_search_prefilter() {
        let store = MemoryStore::new("Test Library");
        store.insert(StoreResource::Item(StoreItem::new(
            "a",
            Some(ROOT_ID),
            "Blue Train",
        )));
        store.insert(StoreResource::Item(StoreItem::new(
            "b",
            Some(ROOT_ID),
            "Giant Steps",
        )));
        let hits = store
            .get_resources_hinted(ROOT_ID, true, 0, 0, Some("blue"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), "a");
    }

    #[tokio::test]
    async fn test_remove_unlinks_from_parent() {
        let store = store_with_items(2);
        store.remove("item-00").unwrap();
        let children = store.get_resources(ROOT_ID, true).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id(), "item-01");
    }

    #[tokio::test]
    async fn test_resolve_playlist_refreshes_timestamp() {
        let store = MemoryStore::new("Test Library");
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut playlist = StoreContainer::new("pl", Some(ROOT_ID), "Morning mix");
        playlist.playlist_source = Some(file.path().to_path_buf());
        playlist.last_modified = SystemTime::UNIX_EPOCH;
        store.insert(StoreResource::Container(playlist));

        let before = store.get_resource("pl").await.unwrap().last_modified();
        store.resolve_playlist("pl").await.unwrap();
        let after = store.get_resource("pl").await.unwrap().last_modified();
        assert!(after > before);
    }

    #[tokio::test]
    async fn test_library_folder_registration() {
        let store = store_with_items(0);
        assert!(store.library_folder(LibraryFolder::Albums).await.is_none());
        store.set_library_folder(LibraryFolder::Albums, "0$albums");
        assert_eq!(
            store.library_folder(LibraryFolder::Albums).await.unwrap(),
            "0$albums"
        );
    }
}
