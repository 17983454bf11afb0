//! Compteur de changements du ContentDirectory.

use std::sync::atomic::{AtomicU32, Ordering};

/// Variable d'état SystemUpdateID.
//
// Compteur monotone non signé 32 bits, incrémenté par le côté mutateur
// (scan, ajout, suppression, renommage) et lu par chaque réponse
// Browse/Search. Un client qui pagine détecte ainsi une mutation en cours
// d'énumération et recommence. Le compteur est détenu par le contexte du
// serveur hôte, pas par un statique de processus.
#[derive(Debug)]
pub struct SystemUpdateId {
    value: AtomicU32,
}

impl SystemUpdateId {
    pub fn new() -> Self {
        Self {
            value: AtomicU32::new(1),
        }
    }

    /// Valeur courante du compteur.
    pub fn current(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }

    /// Incrémente le compteur et retourne la nouvelle valeur.
    ///
    /// Le débordement boucle selon la sémantique ui4 du protocole.
    pub fn bump(&self) -> u32 {
        self.value.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }
}

impl Default for SystemUpdateId {
    fn default() -> Self {
        Self::new()
    }
}
