//! Document de capacités X_GetFeatureList.

/// Construit le document Features de la vue basique (BASICVIEW).
///
/// Annonce les types de containers de premier niveau disponibles sous la
/// racine de l'arbre. Les trois types pointent vers le même container racine.
pub(crate) fn build_feature_list(root_object_id: &str) -> String {
    format!(
        "<Features xmlns=\"urn:schemas-upnp-org:av:avs\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xsi:schemaLocation=\"urn:schemas-upnp-org:av:avs http://www.upnp.org/schemas/av/avs.xsd\">\
         <Feature name=\"samsung.com_BASICVIEW\" version=\"1\">\
         <container id=\"{id}\" type=\"object.item.audioItem\"/>\
         <container id=\"{id}\" type=\"object.item.videoItem\"/>\
         <container id=\"{id}\" type=\"object.item.imageItem\"/>\
         </Feature>\
         </Features>",
        id = root_object_id
    )
}
