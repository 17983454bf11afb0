//! Recherche dans la hiérarchie de contenu.
//!
//! La recherche tente d'abord de compiler les critères en requête structurée
//! via [`QueryTranslator`]. Tout échec de traduction est routinier : il
//! déclenche le repli search-to-browse, qui navigue le container demandé et
//! filtre côté client.

use async_trait::async_trait;
#[cfg(feature = "legacy-menu")]
use omsstore::LibraryFolder;
use omsstore::{MediaStore, RendererProfile, SortCriterion, StoreResource};
use tracing::debug;

use crate::config::ContentDirectoryConfig;
use crate::contentdirectory::BrowseResponse;
use crate::contentdirectory::browse::assemble_page;
use crate::contentdirectory::errors::{ContentDirectoryError, QueryTranslationError};
use crate::contentdirectory::state::SystemUpdateId;

/// Compilateur de requêtes structurées (collaborateur externe).
///
/// Une implémentation typique traduit les critères UPnP en SQL exécuté par
/// la couche de persistance. L'appel peut bloquer sur un backend : il est
/// invoqué hors du thread de traitement protocolaire.
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    /// Compile et exécute la recherche. Le résultat retourné respecte déjà
    /// le contrat de pagination et de tri des actions Browse/Search.
    async fn translate(
        &self,
        search_criteria: &str,
        container_id: &str,
        starting_index: u32,
        requested_count: u32,
        sort_criteria: &[SortCriterion],
        renderer: &RendererProfile,
    ) -> Result<BrowseResponse, QueryTranslationError>;
}

/// Filtre de repli côté client : ne garde que les ressources dont le nom
/// contient la chaîne cherchée (insensible à la casse). Filet de sécurité
/// par-dessus le pré-filtrage éventuel du store.
fn filter_resources_by_name(resources: &mut Vec<StoreResource>, search: &str) {
    let needle = search.to_lowercase();
    resources.retain(|r| r.title().to_lowercase().contains(&needle));
}

/// Extrait la valeur comprise entre deux délimiteurs fixes.
#[cfg(feature = "legacy-menu")]
fn enclosed_value(content: &str, left: &str, right: &str) -> Option<String> {
    let start = content.find(left)? + left.len();
    let end = content[start..].find(right)? + start;
    Some(content[start..end].to_string())
}

/// Table de correspondance des codes de menu aplatis.
///
/// Les appareils concernés adressent les vues virtuelles de la bibliothèque
/// par code numérique fixe au lieu d'un chemin d'arbre. Le code `1` est
/// particulier : le nom d'artiste est extrait des critères bruts et rejoué
/// comme recherche dans le dossier artistes.
#[cfg(feature = "legacy-menu")]
async fn remap_legacy_code(
    store: &dyn MediaStore,
    code: &str,
    raw_criteria: &str,
) -> Option<(String, Option<String>)> {
    let folder = match code {
        "7" => LibraryFolder::Albums,
        "6" => LibraryFolder::Artists,
        "5" => LibraryFolder::Genres,
        "F" => LibraryFolder::Playlists,
        "4" => LibraryFolder::All,
        "1" => {
            let artist = enclosed_value(raw_criteria, "upnp:artist = &quot;", "&quot;)")?;
            let container_id = store.library_folder(LibraryFolder::Artists).await?;
            return Some((container_id, Some(artist)));
        }
        _ => return None,
    };
    store.library_folder(folder).await.map(|id| (id, None))
}

/// Repli search-to-browse.
///
/// Navigue le container demandé, filtre par nom côté client puis applique le
/// même pipeline que Browse (compatibilité, tri, TotalMatches, pagination,
/// DIDL). Un ContainerID irrésoluble produit un résultat vide plutôt qu'une
/// faute : la plupart des renderers ne savent pas se remettre d'une faute au
/// milieu d'une énumération.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn search_to_browse(
    store: &dyn MediaStore,
    system_update_id: &SystemUpdateId,
    config: &ContentDirectoryConfig,
    container_id: &str,
    search_criteria: &str,
    starting_index: u32,
    requested_count: u32,
    criteria: &[SortCriterion],
    renderer: &RendererProfile,
) -> Result<BrowseResponse, ContentDirectoryError> {
    let mut container_id = if container_id.is_empty() {
        omsstore::ROOT_ID.to_string()
    } else {
        container_id.to_string()
    };
    let mut search = if search_criteria.is_empty() {
        None
    } else {
        Some(search_criteria.to_string())
    };

    // Les appareils à menu aplati adressent les vues par code, pas par
    // chemin composé.
    let legacy = cfg!(feature = "legacy-menu")
        && renderer.legacy_flattened_menu
        && !container_id.contains('$');
    #[cfg(feature = "legacy-menu")]
    if legacy {
        let legacy_code = std::mem::replace(&mut container_id, omsstore::ROOT_ID.to_string());
        let raw_criteria = search.take().unwrap_or_default();
        if let Some((folder_id, artist)) =
            remap_legacy_code(store, &legacy_code, &raw_criteria).await
        {
            debug!(code = %legacy_code, container_id = %folder_id, "Remapped legacy menu code");
            container_id = folder_id;
            search = artist;
        }
    }

    let mut candidates = store
        .get_resources_hinted(
            &container_id,
            true,
            starting_index,
            requested_count,
            search.as_deref(),
        )
        .await;

    if let (Some(resources), Some(needle)) = (candidates.as_mut(), search.as_deref()) {
        filter_resources_by_name(resources, needle);
        // Les menus aplatis attendent le contenu du résultat trouvé, pas le
        // résultat lui-même : descendre d'un niveau.
        if legacy
            && let Some(first) = resources.first()
            && first.is_container()
        {
            let first_id = first.id().to_string();
            if let Some(children) = store.get_resources(&first_id, true).await {
                candidates = Some(children);
            }
        }
    }

    match assemble_page(
        store,
        system_update_id,
        config,
        candidates,
        &container_id,
        true,
        starting_index,
        requested_count,
        criteria,
        renderer,
    )
    .await
    {
        Err(ContentDirectoryError::NoSuchObject(id)) => {
            debug!(container_id = %id, "Search on an unresolvable container, returning empty result");
            Ok(BrowseResponse::empty(system_update_id.current()))
        }
        other => other,
    }
}
