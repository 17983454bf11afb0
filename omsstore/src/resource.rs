//! Resource model of the media tree.
//!
//! The tree holds exactly two kinds of nodes, so [`StoreResource`] is a
//! closed tagged variant rather than an open hierarchy: every operation
//! (compatibility check, DIDL rendering) is a match over the kind.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use crate::renderer::RendererProfile;
use crate::{Result, StoreError};

/// A transcoding engine bound to an item.
///
/// The transcoding engine itself is an external collaborator; the store only
/// needs to know whether the bound engine can serve a given renderer.
pub trait TranscodeEngine: Send + Sync + fmt::Debug {
    /// Engine identifier, e.g. `"ffmpeg-audio"`.
    fn name(&self) -> &str;

    /// Whether this engine can produce output the renderer accepts.
    fn is_engine_compatible(&self, renderer: &RendererProfile) -> bool;
}

/// Native compatibility of an item with a renderer.
#[derive(Debug, Clone, Default)]
pub enum Compatibility {
    /// Playable by any renderer.
    #[default]
    Always,
    /// Not natively playable by any renderer.
    Never,
    /// Playable only by the named renderer models.
    Renderers(Vec<String>),
}

impl Compatibility {
    pub fn matches(&self, renderer: &RendererProfile) -> bool {
        match self {
            Compatibility::Always => true,
            Compatibility::Never => false,
            Compatibility::Renderers(names) => names.iter().any(|n| n == &renderer.name),
        }
    }
}

/// A container node: folder, playlist or virtual library view.
#[derive(Debug, Clone)]
pub struct StoreContainer {
    pub id: String,
    /// Back-reference for lookup only; the parent owns the child, not the
    /// other way around.
    pub parent_id: Option<String>,
    pub title: String,
    pub class: String,
    /// Ordered child ids.
    pub children: Vec<String>,
    pub last_modified: SystemTime,
    /// Backing file of a playlist-type container. When the file is newer
    /// than `last_modified` the container must be re-materialized.
    pub playlist_source: Option<PathBuf>,
    /// A transcode folder intentionally exposes every transcoding variant of
    /// one source regardless of renderer compatibility.
    pub transcode_folder: bool,
}

impl StoreContainer {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            title: title.into(),
            class: "object.container.storageFolder".to_string(),
            children: Vec::new(),
            last_modified: SystemTime::now(),
            playlist_source: None,
            transcode_folder: false,
        }
    }

    /// Number of children known to the container, filtered or not.
    pub fn children_count(&self) -> u32 {
        self.children.len() as u32
    }

    /// Whether the backing playlist file changed since the container was
    /// last materialized. The stat runs on the runtime's blocking pool so a
    /// browse task never stalls its worker.
    pub async fn is_stale_playlist(&self) -> bool {
        match &self.playlist_source {
            Some(path) => match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
                Ok(modified) => self.last_modified < modified,
                Err(_) => false,
            },
            None => false,
        }
    }
}

/// An item node: one playable media object.
#[derive(Debug, Clone)]
pub struct StoreItem {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub class: String,
    /// Native compatibility predicate.
    pub compatibility: Compatibility,
    /// Transcoding engine bound to this item, if any.
    pub engine: Option<Arc<dyn TranscodeEngine>>,
    /// The item lives inside a transcode folder and must always be exposed
    /// so the user can manually override a bad compatibility guess.
    pub in_transcode_folder: bool,
    /// Path of the backing file, used for bookmarks.
    pub file_path: Option<PathBuf>,
    pub creator: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<String>,
    pub uri: Option<String>,
    pub protocol_info: Option<String>,
    pub last_modified: SystemTime,
}

impl StoreItem {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            title: title.into(),
            class: "object.item.audioItem.musicTrack".to_string(),
            compatibility: Compatibility::Always,
            engine: None,
            in_transcode_folder: false,
            file_path: None,
            creator: None,
            artist: None,
            album: None,
            genre: None,
            duration: None,
            uri: None,
            protocol_info: None,
            last_modified: SystemTime::now(),
        }
    }
}

/// A node of the media tree.
#[derive(Debug, Clone)]
pub enum StoreResource {
    Container(StoreContainer),
    Item(StoreItem),
}

impl StoreResource {
    pub fn id(&self) -> &str {
        match self {
            StoreResource::Container(c) => &c.id,
            StoreResource::Item(i) => &i.id,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self {
            StoreResource::Container(c) => c.parent_id.as_deref(),
            StoreResource::Item(i) => i.parent_id.as_deref(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            StoreResource::Container(c) => &c.title,
            StoreResource::Item(i) => &i.title,
        }
    }

    pub fn upnp_class(&self) -> &str {
        match self {
            StoreResource::Container(c) => &c.class,
            StoreResource::Item(i) => &i.class,
        }
    }

    pub fn last_modified(&self) -> SystemTime {
        match self {
            StoreResource::Container(c) => c.last_modified,
            StoreResource::Item(i) => i.last_modified,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, StoreResource::Container(_))
    }

    pub fn as_container(&self) -> Option<&StoreContainer> {
        match self {
            StoreResource::Container(c) => Some(c),
            StoreResource::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&StoreItem> {
        match self {
            StoreResource::Container(_) => None,
            StoreResource::Item(i) => Some(i),
        }
    }

    /// Whether the resource may be exposed to the given renderer.
    ///
    /// Containers pass unconditionally. An item passes if it is natively
    /// compatible and its bound engine, if any, can serve the renderer.
    /// Items inside a transcode folder always pass: the renderer settings
    /// could be wrong and the user needs every variant to override them.
    pub fn is_compatible(&self, renderer: &RendererProfile) -> bool {
        match self {
            StoreResource::Container(_) => true,
            StoreResource::Item(item) => {
                if item.in_transcode_folder {
                    return true;
                }
                item.compatibility.matches(renderer)
                    && item
                        .engine
                        .as_ref()
                        .is_none_or(|e| e.is_engine_compatible(renderer))
            }
        }
    }

    /// Renders this node as its own DIDL-Lite element.
    ///
    /// User-supplied values are escaped with [`omsdidl::encode_xml`] before
    /// serialization, which escapes again: the fragment carries two escape
    /// levels and [`omsdidl::assemble_fragments`] removes exactly one.
    /// Items that rely on a transcoding engine advertise a wildcard
    /// protocolInfo, since the delivered format depends on the engine.
    pub fn to_didl_xml(&self, _renderer: &RendererProfile) -> Result<String> {
        let encode_opt = |v: &Option<String>| v.as_deref().map(omsdidl::encode_xml);
        match self {
            StoreResource::Container(c) => {
                let container = omsdidl::Container {
                    id: omsdidl::encode_xml(&c.id),
                    parent_id: c
                        .parent_id
                        .as_deref()
                        .map(omsdidl::encode_xml)
                        .unwrap_or_else(|| "-1".to_string()),
                    restricted: Some("1".to_string()),
                    child_count: Some(c.children_count().to_string()),
                    title: omsdidl::encode_xml(&c.title),
                    class: c.class.clone(),
                };
                Ok(container.to_xml().map_err(StoreError::Didl)?)
            }
            StoreResource::Item(i) => {
                let resources = match &i.uri {
                    Some(uri) => {
                        let protocol_info = match (&i.protocol_info, &i.engine) {
                            (Some(info), _) => info.clone(),
                            (None, Some(_)) => "http-get:*:*:*".to_string(),
                            (None, None) => "http-get:*:audio/mpeg:*".to_string(),
                        };
                        vec![omsdidl::Res {
                            protocol_info,
                            duration: i.duration.clone(),
                            url: omsdidl::encode_xml(uri),
                        }]
                    }
                    None => Vec::new(),
                };
                let item = omsdidl::Item {
                    id: omsdidl::encode_xml(&i.id),
                    parent_id: i
                        .parent_id
                        .as_deref()
                        .map(omsdidl::encode_xml)
                        .unwrap_or_else(|| "-1".to_string()),
                    restricted: Some("1".to_string()),
                    title: omsdidl::encode_xml(&i.title),
                    creator: encode_opt(&i.creator),
                    class: i.class.clone(),
                    artist: encode_opt(&i.artist),
                    album: encode_opt(&i.album),
                    genre: encode_opt(&i.genre),
                    date: None,
                    resources,
                };
                Ok(item.to_xml().map_err(StoreError::Didl)?)
            }
        }
    }
}
