//! Erreurs protocolaires du service ContentDirectory.

use omsstore::StoreError;
use thiserror::Error;

/// Fautes UPnP retournées au client.
///
/// Un renderer reçoit soit une page valide (éventuellement vide), soit une
/// faute protocolaire bien formée, jamais une erreur interne brute.
#[derive(Debug, Error)]
pub enum ContentDirectoryError {
    /// L'ObjectID ne résout vers aucun objet navigable (code UPnP 701).
    #[error("No such object: {0}")]
    NoSuchObject(String),

    /// SortCriteria malformé ou propriété inconnue (code UPnP 709).
    #[error("Unsupported sort criteria: {0}")]
    UnsupportedSortCriteria(String),

    /// Toute erreur interne inattendue (code UPnP 501).
    #[error("Action failed: {0}")]
    ActionFailed(String),
}

impl ContentDirectoryError {
    /// Code de faute UPnP correspondant.
    pub fn error_code(&self) -> u16 {
        match self {
            ContentDirectoryError::NoSuchObject(_) => 701,
            ContentDirectoryError::UnsupportedSortCriteria(_) => 709,
            ContentDirectoryError::ActionFailed(_) => 501,
        }
    }
}

impl From<StoreError> for ContentDirectoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidSortCriterion(c) => ContentDirectoryError::UnsupportedSortCriteria(c),
            other => ContentDirectoryError::ActionFailed(other.to_string()),
        }
    }
}

/// Échec de compilation d'une requête structurée.
///
/// Erreur strictement interne : elle déclenche toujours le repli
/// search-to-browse et n'est jamais exposée au client.
#[derive(Debug, Error)]
pub enum QueryTranslationError {
    #[error("Unsupported search grammar: {0}")]
    UnsupportedGrammar(String),

    #[error("Query backend error: {0}")]
    Backend(String),
}
