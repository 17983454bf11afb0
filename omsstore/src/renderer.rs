//! Renderer capability profile.
//!
//! Real renderers come with per-model quirks. Instead of virtual methods on
//! a renderer object, the quirks that matter to the browse/search algorithms
//! are carried in this plain struct and passed by value into pure functions,
//! so the branching stays limited to the documented heuristics.

/// Capability and quirk flags for the client consuming the service.
#[derive(Debug, Clone, Default)]
pub struct RendererProfile {
    /// Display name of the renderer model.
    pub name: String,

    /// Account/identity the renderer is bound to, if any.
    pub account_id: Option<String>,

    /// The renderer pages through content in small batches while the tree is
    /// analyzed lazily, so exact match counts are unknowable and TotalMatches
    /// must be inflated to keep it asking for the next page.
    pub uses_tree_hack: bool,

    /// The renderer addresses fixed virtual library views by numeric code
    /// instead of tree paths (legacy flattened-menu devices).
    pub legacy_flattened_menu: bool,
}

impl RendererProfile {
    /// A profile with no quirks, suitable for well-behaved clients.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tree_hack(mut self) -> Self {
        self.uses_tree_hack = true;
        self
    }

    pub fn with_legacy_flattened_menu(mut self) -> Self {
        self.legacy_flattened_menu = true;
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}
