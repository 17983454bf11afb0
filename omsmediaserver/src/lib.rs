//! # omsmediaserver - Serveur de contenu UPnP
//!
//! Ce crate implémente le cœur du service ContentDirectory:1 d'un MediaServer
//! UPnP/DLNA : navigation (Browse), recherche (Search), capacités et suivi des
//! changements.
//!
//! ## Architecture
//!
//! ```text
//! Liaison protocolaire (SOAP/HTTP, externe)
//!       ↓
//! ContentDirectoryService - actions du service
//!       ↓
//! MediaStore / RendererProfile / Sorter (omsstore)
//!       ↓
//! Résultat DIDL-Lite (omsdidl)
//! ```
//!
//! Chaque invocation Browse/Search est une unité de travail indépendante :
//! le service ne détient aucun verrou à l'échelle d'une requête, lit un
//! instantané cohérent de l'arbre, calcule et retourne. Le seul état mutable
//! partagé est le compteur [`contentdirectory::SystemUpdateId`].

pub mod config;
pub mod contentdirectory;

pub use config::ContentDirectoryConfig;
pub use contentdirectory::{
    BookmarkStore, BrowseResponse, ContentDirectoryError, ContentDirectoryService,
    QueryTranslationError, QueryTranslator, SystemUpdateId,
};
