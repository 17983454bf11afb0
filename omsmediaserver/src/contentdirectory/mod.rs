//! # Service ContentDirectory:1
//!
//! Ce module implémente le service ContentDirectory:1 selon la spécification
//! UPnP AV pour MediaServer. Le service permet de naviguer et rechercher dans
//! la hiérarchie de contenu exposée par le [`MediaStore`].
//!
//! ## Actions implémentées
//!
//! Actions obligatoires :
//! - ✅ Browse
//! - ✅ GetSearchCapabilities
//! - ✅ GetSortCapabilities
//! - ✅ GetSystemUpdateID
//!
//! Actions optionnelles :
//! - ✅ Search
//! - ✅ X_SetBookmark (reprise de lecture)
//! - ✅ X_GetFeatureList (vue basique)
//!
//! ## Architecture
//!
//! [`ContentDirectoryService`] est le contexte explicite détenu par le
//! serveur hôte : il porte le store, le compteur de changements et les
//! collaborateurs optionnels (traducteur de requêtes, persistance des
//! signets). La liaison protocolaire (SOAP, descripteurs d'appareil,
//! événementiel GENA) vit ailleurs et appelle ces méthodes.
//!
//! ## Références
//!
//! - [UPnP ContentDirectory:1 Service Template](https://upnp.org/specs/av/UPnP-av-ContentDirectory-v1-Service.pdf)

pub mod bookmark;
pub mod browse;
pub mod errors;
pub mod feature_list;
pub mod search;
pub mod state;

use std::sync::Arc;

use omsstore::{MediaStore, RendererProfile, StoreResource, parse_sort_criteria};
use tracing::{debug, error};

pub use bookmark::BookmarkStore;
pub use browse::BrowseFlag;
pub use errors::{ContentDirectoryError, QueryTranslationError};
pub use search::QueryTranslator;
pub use state::SystemUpdateId;

use crate::config::ContentDirectoryConfig;

/// Capacités de tri annoncées par GetSortCapabilities.
pub const SORT_CAPABILITIES: &str =
    "upnp:class,dc:title,dc:creator,upnp:artist,upnp:album,upnp:genre";

/// Résultat d'une action Browse ou Search.
#[derive(Debug, Clone)]
pub struct BrowseResponse {
    /// Payload DIDL-Lite.
    pub result: String,
    /// Nombre d'objets dans cette page.
    pub number_returned: u32,
    /// Nombre total d'objets correspondants (ou heuristique, voir Browse).
    pub total_matches: u32,
    /// Instantané du SystemUpdateID à l'achèvement de la requête.
    pub update_id: u32,
}

impl BrowseResponse {
    /// Page vide, utilisée quand la disponibilité prime sur une faute.
    pub fn empty(update_id: u32) -> Self {
        Self {
            result: omsdidl::assemble_fragments(std::iter::empty::<&str>()),
            number_returned: 0,
            total_matches: 0,
            update_id,
        }
    }
}

/// Service ContentDirectory.
///
/// Chaque méthode d'action est une unité de travail indépendante, prévue
/// pour s'exécuter en concurrence avec d'autres sur le pool de la liaison
/// protocolaire. Le service ne détient aucun verrou de requête.
pub struct ContentDirectoryService {
    store: Arc<dyn MediaStore>,
    translator: Option<Arc<dyn QueryTranslator>>,
    bookmarks: Option<Arc<dyn BookmarkStore>>,
    system_update_id: Arc<SystemUpdateId>,
    config: ContentDirectoryConfig,
}

impl ContentDirectoryService {
    /// Crée un service sur le store donné, sans collaborateurs optionnels.
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self {
            store,
            translator: None,
            bookmarks: None,
            system_update_id: Arc::new(SystemUpdateId::new()),
            config: ContentDirectoryConfig::default(),
        }
    }

    /// Branche un traducteur de requêtes structurées.
    pub fn with_translator(mut self, translator: Arc<dyn QueryTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Branche la persistance des signets de reprise.
    pub fn with_bookmarks(mut self, bookmarks: Arc<dyn BookmarkStore>) -> Self {
        self.bookmarks = Some(bookmarks);
        self
    }

    pub fn with_config(mut self, config: ContentDirectoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Compteur de changements, partagé avec le côté mutateur de l'arbre
    /// (scanner, éditions) qui l'incrémente à chaque mutation.
    pub fn system_update_id(&self) -> Arc<SystemUpdateId> {
        self.system_update_id.clone()
    }

    /// Action Browse.
    ///
    /// Un SortCriteria invalide rejette la requête avant tout accès à
    /// l'arbre. L'argument Filter est accepté mais non appliqué : chaque
    /// nœud rend l'ensemble de ses propriétés.
    pub async fn browse(
        &self,
        object_id: &str,
        browse_flag: &str,
        _filter: &str,
        starting_index: u32,
        requested_count: u32,
        sort_criteria: &str,
        renderer: &RendererProfile,
    ) -> Result<BrowseResponse, ContentDirectoryError> {
        let criteria = parse_sort_criteria(sort_criteria).map_err(|e| {
            debug!(sort_criteria = %sort_criteria, "Rejecting browse with invalid sort criteria");
            ContentDirectoryError::from(e)
        })?;
        let flag = BrowseFlag::parse(browse_flag)?;
        let object_id = if object_id.is_empty() {
            omsstore::ROOT_ID
        } else {
            object_id
        };

        debug!(
            object_id = %object_id,
            browse_flag = %browse_flag,
            starting_index = %starting_index,
            requested_count = %requested_count,
            "ContentDirectory::Browse"
        );

        let direct_children = flag == BrowseFlag::DirectChildren;
        let candidates = self
            .store
            .get_resources_hinted(
                object_id,
                direct_children,
                starting_index,
                requested_count,
                None,
            )
            .await;

        browse::assemble_page(
            self.store.as_ref(),
            &self.system_update_id,
            &self.config,
            candidates,
            object_id,
            direct_children,
            starting_index,
            requested_count,
            &criteria,
            renderer,
        )
        .await
    }

    /// Action Search.
    ///
    /// Tente d'abord la traduction en requête structurée ; tout échec de
    /// traduction déclenche le repli search-to-browse et n'est jamais
    /// exposé au client.
    pub async fn search(
        &self,
        container_id: &str,
        search_criteria: &str,
        _filter: &str,
        starting_index: u32,
        requested_count: u32,
        sort_criteria: &str,
        renderer: &RendererProfile,
    ) -> Result<BrowseResponse, ContentDirectoryError> {
        let criteria = parse_sort_criteria(sort_criteria).map_err(|e| {
            debug!(sort_criteria = %sort_criteria, "Rejecting search with invalid sort criteria");
            ContentDirectoryError::from(e)
        })?;

        debug!(
            container_id = %container_id,
            search_criteria = %search_criteria,
            "ContentDirectory::Search"
        );

        if let Some(translator) = &self.translator {
            match translator
                .translate(
                    search_criteria,
                    container_id,
                    starting_index,
                    requested_count,
                    &criteria,
                    renderer,
                )
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(error = %e, "Query translation failed, falling back to content browsing");
                }
            }
        }

        search::search_to_browse(
            self.store.as_ref(),
            &self.system_update_id,
            &self.config,
            container_id,
            search_criteria,
            starting_index,
            requested_count,
            &criteria,
            renderer,
        )
        .await
    }

    /// Action GetSearchCapabilities.
    ///
    /// La recherche structurée n'est pas annoncée : le repli est purement
    /// interne.
    pub fn get_search_capabilities(&self) -> &'static str {
        ""
    }

    /// Action GetSortCapabilities.
    pub fn get_sort_capabilities(&self) -> &'static str {
        SORT_CAPABILITIES
    }

    /// Action GetSystemUpdateID.
    pub fn get_system_update_id(&self) -> u32 {
        self.system_update_id.current()
    }

    /// Action X_SetBookmark.
    ///
    /// Certains renderers envoient un X_SetBookmark avec position 0 dès le
    /// début de lecture : faux déclenchement connu, traité comme un no-op.
    pub async fn set_bookmark(
        &self,
        object_id: &str,
        pos_second: u32,
        _category_type: &str,
        _rid: &str,
        renderer: &RendererProfile,
    ) -> Result<(), ContentDirectoryError> {
        if pos_second == 0 {
            debug!(object_id = %object_id, "Skipping bookmark update, position = 0");
            return Ok(());
        }

        let Some(bookmarks) = &self.bookmarks else {
            debug!("No bookmark store configured, ignoring X_SetBookmark");
            return Ok(());
        };

        let resource = self.store.get_resource(object_id).await.ok_or_else(|| {
            ContentDirectoryError::ActionFailed(format!("Unknown bookmark object: {object_id}"))
        })?;
        let StoreResource::Item(item) = resource else {
            return Err(ContentDirectoryError::ActionFailed(format!(
                "Bookmark target is not an item: {object_id}"
            )));
        };
        let Some(path) = &item.file_path else {
            return Err(ContentDirectoryError::ActionFailed(format!(
                "Bookmark target has no backing file: {object_id}"
            )));
        };

        bookmarks
            .set_bookmark(path, pos_second, renderer.account_id.as_deref())
            .await
            .map_err(|e| {
                error!(object_id = %object_id, error = %e, "Bookmark persistence failed");
                ContentDirectoryError::ActionFailed(e.to_string())
            })
    }

    /// Action X_GetFeatureList.
    pub fn get_feature_list(&self) -> String {
        feature_list::build_feature_list(&self.config.root_object_id)
    }
}
