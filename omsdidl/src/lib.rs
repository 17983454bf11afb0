//! # omsdidl - DIDL-Lite
//!
//! Structures et utilitaires pour le format DIDL-Lite utilisé par les actions
//! ContentDirectory UPnP/DLNA.
//!
//! Le module fournit :
//! - Les structures sérialisables [`DidlLite`], [`Container`], [`Item`] et [`Res`]
//! - Les constantes d'enveloppe [`DIDL_HEADER`] / [`DIDL_FOOTER`]
//! - [`assemble_fragments`] qui concatène des éléments DIDL pré-rendus dans une
//!   enveloppe unique, en annulant le double-échappement introduit par la couche
//!   SOAP externe

use serde::{Deserialize, Serialize};

/// En-tête de l'enveloppe DIDL-Lite avec les namespaces UPnP standard.
pub const DIDL_HEADER: &str = "<DIDL-Lite xmlns=\"urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
xmlns:upnp=\"urn:schemas-upnp-org:metadata-1-0/upnp/\" \
xmlns:dlna=\"urn:schemas-dlna-org:metadata-1-0/\">";

/// Pied de l'enveloppe DIDL-Lite.
pub const DIDL_FOOTER: &str = "</DIDL-Lite>";

/// Erreurs de sérialisation DIDL-Lite.
#[derive(Debug, thiserror::Error)]
pub enum DidlError {
    #[error("Failed to serialize DIDL-Lite: {0}")]
    Serialize(String),

    #[error("Failed to parse DIDL-Lite: {0}")]
    Parse(#[from] quick_xml::de::DeError),
}

/// Racine d'un document DIDL-Lite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "DIDL-Lite")]
pub struct DidlLite {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:upnp", skip_serializing_if = "Option::is_none")]
    pub xmlns_upnp: Option<String>,

    #[serde(rename = "@xmlns:dc", skip_serializing_if = "Option::is_none")]
    pub xmlns_dc: Option<String>,

    #[serde(rename = "@xmlns:dlna", skip_serializing_if = "Option::is_none")]
    pub xmlns_dlna: Option<String>,

    #[serde(rename = "container", default)]
    pub containers: Vec<Container>,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

impl DidlLite {
    /// Crée un document vide avec les namespaces standard.
    pub fn new() -> Self {
        Self {
            xmlns: "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/".to_string(),
            xmlns_upnp: Some("urn:schemas-upnp-org:metadata-1-0/upnp/".to_string()),
            xmlns_dc: Some("http://purl.org/dc/elements/1.1/".to_string()),
            xmlns_dlna: Some("urn:schemas-dlna-org:metadata-1-0/".to_string()),
            containers: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Sérialise le document complet en XML.
    pub fn to_xml(&self) -> Result<String, DidlError> {
        quick_xml::se::to_string(self).map_err(|e| DidlError::Serialize(e.to_string()))
    }

    /// Parse un document DIDL-Lite.
    pub fn parse(input: &str) -> Result<Self, DidlError> {
        Ok(quick_xml::de::from_str(input)?)
    }
}

impl Default for DidlLite {
    fn default() -> Self {
        Self::new()
    }
}

/// Container pouvant contenir d'autres containers ou items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID")]
    pub parent_id: String,

    #[serde(rename = "@restricted", skip_serializing_if = "Option::is_none")]
    pub restricted: Option<String>,

    #[serde(rename = "@childCount", skip_serializing_if = "Option::is_none")]
    pub child_count: Option<String>,

    #[serde(rename = "dc:title", alias = "title")]
    pub title: String,

    #[serde(rename = "upnp:class", alias = "class")]
    pub class: String,
}

impl Container {
    /// Sérialise ce container en élément `<container>` isolé.
    pub fn to_xml(&self) -> Result<String, DidlError> {
        quick_xml::se::to_string_with_root("container", self)
            .map_err(|e| DidlError::Serialize(e.to_string()))
    }
}

/// Item représentant un objet média
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID")]
    pub parent_id: String,

    #[serde(rename = "@restricted", skip_serializing_if = "Option::is_none")]
    pub restricted: Option<String>,

    #[serde(rename = "dc:title", alias = "title")]
    pub title: String,

    #[serde(
        rename = "dc:creator",
        alias = "creator",
        skip_serializing_if = "Option::is_none"
    )]
    pub creator: Option<String>,

    #[serde(rename = "upnp:class", alias = "class")]
    pub class: String,

    #[serde(
        rename = "upnp:artist",
        alias = "artist",
        skip_serializing_if = "Option::is_none"
    )]
    pub artist: Option<String>,

    #[serde(
        rename = "upnp:album",
        alias = "album",
        skip_serializing_if = "Option::is_none"
    )]
    pub album: Option<String>,

    #[serde(
        rename = "upnp:genre",
        alias = "genre",
        skip_serializing_if = "Option::is_none"
    )]
    pub genre: Option<String>,

    #[serde(
        rename = "dc:date",
        alias = "date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    #[serde(rename = "res", default)]
    pub resources: Vec<Res>,
}

impl Item {
    /// Sérialise cet item en élément `<item>` isolé.
    pub fn to_xml(&self) -> Result<String, DidlError> {
        quick_xml::se::to_string_with_root("item", self)
            .map_err(|e| DidlError::Serialize(e.to_string()))
    }
}

/// Ressource média (URI de streaming)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Res {
    #[serde(rename = "@protocolInfo")]
    pub protocol_info: String,

    #[serde(rename = "@duration", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(rename = "$text")]
    pub url: String,
}

/// Échappe une valeur texte pour insertion dans un document XML.
///
/// La substitution de l'esperluette est faite en premier pour ne pas
/// ré-échapper les entités produites ensuite.
pub fn encode_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Annule exactement un niveau d'échappement XML.
///
/// Chaque entité n'est décodée qu'une seule fois par passe : une entité
/// doublée comme `&amp;lt;` redevient `&lt;`, jamais `<`. Une esperluette
/// qui n'introduit aucune entité connue est copiée telle quelle.
pub fn un_encode_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let (decoded, len) = if rest.starts_with("&amp;") {
            ("&", "&amp;".len())
        } else if rest.starts_with("&lt;") {
            ("<", "&lt;".len())
        } else if rest.starts_with("&gt;") {
            (">", "&gt;".len())
        } else if rest.starts_with("&quot;") {
            ("\"", "&quot;".len())
        } else if rest.starts_with("&apos;") {
            ("'", "&apos;".len())
        } else {
            ("&", 1)
        };
        out.push_str(decoded);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}

/// Assemble des éléments DIDL pré-rendus dans une enveloppe DIDL-Lite unique.
///
/// Chaque nœud du store rend son propre élément `<container>`/`<item>` avec
/// ses valeurs textuelles échappées deux fois (une passe [`encode_xml`] avant
/// la sérialisation, qui échappe elle-même) ; cette fonction les concatène
/// entre [`DIDL_HEADER`] et [`DIDL_FOOTER`] puis annule une passe avec
/// [`un_encode_xml`]. Le payload final est donc échappé exactement une fois.
pub fn assemble_fragments<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut data = String::from(DIDL_HEADER);
    for fragment in fragments {
        data.push_str(fragment.as_ref());
    }
    data.push_str(DIDL_FOOTER);
    un_encode_xml(&data)
}
