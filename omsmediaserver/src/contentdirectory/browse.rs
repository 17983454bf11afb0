//! Navigation dans la hiérarchie de contenu.
//!
//! Le pipeline d'assemblage de page ([`assemble_page`]) est partagé entre
//! Browse et le repli search-to-browse : filtrage de compatibilité, tri,
//! calcul de TotalMatches, pagination et assemblage DIDL-Lite.

use omsdidl::assemble_fragments;
use omsstore::{MediaStore, RendererProfile, SortCriterion, StoreResource, sort_resources};
use tracing::{debug, trace, warn};

use crate::config::ContentDirectoryConfig;
use crate::contentdirectory::BrowseResponse;
use crate::contentdirectory::errors::ContentDirectoryError;
use crate::contentdirectory::state::SystemUpdateId;

/// Mode de navigation d'une requête Browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseFlag {
    Metadata,
    DirectChildren,
}

impl BrowseFlag {
    /// Parse la valeur wire de l'argument BrowseFlag.
    pub fn parse(value: &str) -> Result<Self, ContentDirectoryError> {
        match value {
            "BrowseMetadata" => Ok(BrowseFlag::Metadata),
            "BrowseDirectChildren" => Ok(BrowseFlag::DirectChildren),
            other => Err(ContentDirectoryError::ActionFailed(format!(
                "Invalid BrowseFlag: {other}"
            ))),
        }
    }
}

/// Assemble une page de résultats à partir d'une liste de candidats.
///
/// Implémente les étapes communes à Browse et Search :
///
/// 1. Re-matérialisation paresseuse des playlists périmées (read-through).
/// 2. Filtrage de compatibilité : les containers passent toujours ; un item
///    passe s'il est compatible avec le renderer et que son éventuel moteur
///    de transcodage l'est aussi. Chaque item rejeté incrémente `bad_count`.
/// 3. Tri stable selon les critères (liste vide = ordre naturel de l'arbre).
/// 4. TotalMatches : 1 en mode Metadata ; heuristique "tree hack" pour les
///    renderers qui analysent le contenu par petits lots ; sinon le nombre
///    d'enfants du container parent moins `bad_count`.
/// 5. Pagination avec bornage : une fenêtre hors limites produit une page
///    vide, jamais une erreur.
/// 6. Concaténation des éléments DIDL pré-rendus dans une enveloppe unique.
pub(crate) async fn assemble_page(
    store: &dyn MediaStore,
    system_update_id: &SystemUpdateId,
    config: &ContentDirectoryConfig,
    candidates: Option<Vec<StoreResource>>,
    object_id: &str,
    direct_children: bool,
    starting_index: u32,
    requested_count: u32,
    criteria: &[SortCriterion],
    renderer: &RendererProfile,
) -> Result<BrowseResponse, ContentDirectoryError> {
    let candidate_count = candidates.as_ref().map_or(0, Vec::len) as u32;
    let first_parent_id = candidates
        .as_ref()
        .and_then(|list| list.first())
        .and_then(|r| r.parent_id())
        .map(str::to_string);

    // Un ObjectID qui ne résout vers rien de navigable est une faute, mais
    // seulement en mode DirectChildren.
    let mut resolved_container = None;
    if direct_children && candidate_count == 0 {
        match store.get_resource(object_id).await {
            Some(StoreResource::Container(container)) => resolved_container = Some(container),
            Some(StoreResource::Item(_)) => {
                debug!(object_id = %object_id, "Browsing direct children of an item");
                return Err(ContentDirectoryError::NoSuchObject(object_id.to_string()));
            }
            None => {
                debug!(object_id = %object_id, "Browsing direct children of an unknown object");
                return Err(ContentDirectoryError::NoSuchObject(object_id.to_string()));
            }
        }
    }

    // Filtrage de compatibilité
    let mut filtered: Vec<StoreResource> = Vec::new();
    let mut bad_count: u32 = 0;
    for mut resource in candidates.into_iter().flatten() {
        if let Some(container) = resource.as_container()
            && container.is_stale_playlist().await
        {
            // La source de la playlist a changé depuis sa matérialisation
            if let Err(e) = store.resolve_playlist(container.id.as_str()).await {
                warn!(object_id = %container.id, error = %e, "Playlist re-resolution failed");
            } else if let Some(fresh) = store.get_resource(resource.id()).await {
                resource = fresh;
            }
        }

        if resource.is_container() || resource.is_compatible(renderer) {
            filtered.push(resource);
        } else {
            bad_count += 1;
        }
    }

    sort_resources(&mut filtered, criteria);

    // Fenêtre de pagination (RequestedCount = 0 : jusqu'à la fin)
    let from = starting_index as usize;
    let to = if requested_count == 0 {
        filtered.len()
    } else {
        (from + requested_count as usize).min(filtered.len())
    };
    let (from, to) = if to < from {
        debug!(
            starting_index = starting_index,
            requested_count = requested_count,
            "Requested objects out of range"
        );
        (0, 0)
    } else {
        (from, to)
    };
    let number_returned = (to - from) as u32;

    let total_matches = if !direct_children {
        // Spec UPnP : BrowseMetadata implique TotalMatches = 1
        1
    } else if renderer.uses_tree_hack {
        // Le contenu est analysé paresseusement par petits lots : le nombre
        // exact d'éléments du dossier est inconnaissable (fichiers invalidés,
        // dossier #transcode, etc.). On annonce un total gonflé pour forcer
        // le renderer à demander les pages suivantes ; valeur calée sur le
        // firmware concerné, à ne pas "corriger".
        if number_returned > 0 {
            starting_index
                .wrapping_add(requested_count)
                .wrapping_add(1) // renvoie 11 quand 10 sont demandés
        } else {
            // Plus d'éléments : renvoyer startingIndex signale la fin
            starting_index
        }
    } else {
        let parent = match (&resolved_container, &first_parent_id) {
            (Some(container), _) => Some(container.clone()),
            (None, Some(parent_id)) => match store.get_resource(parent_id).await {
                Some(StoreResource::Container(c)) => Some(c),
                _ => None,
            },
            (None, None) => None,
        };
        match parent {
            Some(parent) => parent.children_count().saturating_sub(bad_count),
            None => candidate_count.saturating_sub(bad_count),
        }
    };

    let mut fragments = Vec::with_capacity(to - from);
    for resource in &filtered[from..to] {
        fragments.push(resource.to_didl_xml(renderer)?);
    }
    let result = assemble_fragments(&fragments);
    if config.debug_didl {
        trace!(result = %result, "DIDL-Lite result");
    }

    Ok(BrowseResponse {
        result,
        number_returned,
        total_matches,
        update_id: system_update_id.current(),
    })
}
