//! Sorting of store resources.
//!
//! Two orderings live here: the UPnP SortCriteria wire grammar used by
//! Browse/Search (a csv of `+`/`-` prefixed property names), and the simple
//! [`SortMethod`] ordering applied when folders are materialized.

use std::cmp::Ordering;

use rand::seq::SliceRandom;

use crate::resource::StoreResource;
use crate::{Result, StoreError};

/// Properties the service accepts in SortCriteria.
///
/// This is the exact set advertised by GetSortCapabilities; anything else
/// must reject the whole request before any tree access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Class,
    Title,
    Creator,
    Artist,
    Album,
    Genre,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Class => "upnp:class",
            SortKey::Title => "dc:title",
            SortKey::Creator => "dc:creator",
            SortKey::Artist => "upnp:artist",
            SortKey::Album => "upnp:album",
            SortKey::Genre => "upnp:genre",
        }
    }

    fn from_wire(property: &str) -> Option<Self> {
        match property {
            "upnp:class" => Some(SortKey::Class),
            "dc:title" => Some(SortKey::Title),
            "dc:creator" => Some(SortKey::Creator),
            "upnp:artist" => Some(SortKey::Artist),
            "upnp:album" => Some(SortKey::Album),
            "upnp:genre" => Some(SortKey::Genre),
            _ => None,
        }
    }
}

/// One entry of a SortCriteria list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortCriterion {
    pub key: SortKey,
    pub ascending: bool,
}

/// Parses a SortCriteria wire string, e.g. `"+dc:title,-upnp:artist"`.
///
/// An empty string yields an empty list (natural tree order is preserved).
/// A missing `+`/`-` prefix or an unknown property is an error: the caller
/// must fail the whole request before touching the tree.
pub fn parse_sort_criteria(sort_criteria: &str) -> Result<Vec<SortCriterion>> {
    let trimmed = sort_criteria.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut criteria = Vec::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        let (ascending, property) = match token.split_at_checked(1) {
            Some(("+", property)) => (true, property),
            Some(("-", property)) => (false, property),
            _ => return Err(StoreError::InvalidSortCriterion(token.to_string())),
        };
        match SortKey::from_wire(property) {
            Some(key) => criteria.push(SortCriterion { key, ascending }),
            None => return Err(StoreError::InvalidSortCriterion(token.to_string())),
        }
    }
    Ok(criteria)
}

fn sort_value(resource: &StoreResource, key: SortKey) -> Option<String> {
    let value = match (resource, key) {
        (_, SortKey::Class) => Some(resource.upnp_class().to_string()),
        (_, SortKey::Title) => Some(resource.title().to_string()),
        (StoreResource::Item(i), SortKey::Creator) => i.creator.clone(),
        (StoreResource::Item(i), SortKey::Artist) => i.artist.clone(),
        (StoreResource::Item(i), SortKey::Album) => i.album.clone(),
        (StoreResource::Item(i), SortKey::Genre) => i.genre.clone(),
        (StoreResource::Container(_), _) => None,
    };
    value.map(|v| v.to_lowercase())
}

/// Stable sort by the given criteria; resources without a value for a key
/// sort after those that have one. An empty criteria list leaves the
/// natural tree order untouched.
pub fn sort_resources(resources: &mut [StoreResource], criteria: &[SortCriterion]) {
    if criteria.is_empty() {
        return;
    }
    resources.sort_by(|a, b| {
        for criterion in criteria {
            let va = sort_value(a, criterion.key);
            let vb = sort_value(b, criterion.key);
            let ordering = match (va, vb) {
                (Some(va), Some(vb)) => va.cmp(&vb),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = if criterion.ascending {
                ordering
            } else {
                ordering.reverse()
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Ordering applied when a folder's content is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMethod {
    /// Case-insensitive title order.
    #[default]
    Title,
    /// Most recently modified first.
    ModifiedNewest,
    /// Least recently modified first.
    ModifiedOldest,
    /// Shuffled order, different on every materialization.
    Random,
}

/// Sorts resources by a folder-level method.
pub fn sort_resources_by_method(resources: &mut [StoreResource], method: SortMethod) {
    match method {
        SortMethod::Title => {
            resources.sort_by_key(|r| r.title().to_lowercase());
        }
        SortMethod::ModifiedNewest => {
            resources.sort_by(|a, b| b.last_modified().cmp(&a.last_modified()));
        }
        SortMethod::ModifiedOldest => {
            resources.sort_by_key(|r| r.last_modified());
        }
        SortMethod::Random => {
            resources.shuffle(&mut rand::rng());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{StoreContainer, StoreItem};

    fn item(id: &str, title: &str, artist: Option<&str>) -> StoreResource {
        let mut item = StoreItem::new(id, Some("0"), title);
        item.artist = artist.map(str::to_string);
        StoreResource::Item(item)
    }

    #[test]
    fn test_parse_empty_criteria() {
        assert!(parse_sort_criteria("").unwrap().is_empty());
        assert!(parse_sort_criteria("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_valid_criteria() {
        let criteria = parse_sort_criteria("+dc:title,-upnp:artist").unwrap();
        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria[0].key, SortKey::Title);
        assert!(criteria[0].ascending);
        assert_eq!(criteria[1].key, SortKey::Artist);
        assert!(!criteria[1].ascending);
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert!(parse_sort_criteria("dc:title").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_property() {
        assert!(parse_sort_criteria("+dc:unknown").is_err());
        // one bad entry poisons the whole list
        assert!(parse_sort_criteria("+dc:title,+x:y").is_err());
    }

    #[test]
    fn test_sort_by_title_descending() {
        let mut resources = vec![
            item("1", "Alpha", None),
            item("2", "charlie", None),
            item("3", "Bravo", None),
        ];
        let criteria = parse_sort_criteria("-dc:title").unwrap();
        sort_resources(&mut resources, &criteria);
        let titles: Vec<&str> = resources.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["charlie", "Bravo", "Alpha"]);
    }

    #[test]
    fn test_sort_is_stable_on_equal_keys() {
        let mut resources = vec![
            item("1", "Same", Some("zz")),
            item("2", "Same", Some("aa")),
        ];
        let criteria = parse_sort_criteria("+dc:title").unwrap();
        sort_resources(&mut resources, &criteria);
        assert_eq!(resources[0].id(), "1");
        assert_eq!(resources[1].id(), "2");
    }

    #[test]
    fn test_multi_key_sort() {
        let mut resources = vec![
            item("1", "Same", Some("zz")),
            item("2", "Same", Some("aa")),
        ];
        let criteria = parse_sort_criteria("+dc:title,+upnp:artist").unwrap();
        sort_resources(&mut resources, &criteria);
        assert_eq!(resources[0].id(), "2");
    }

    #[test]
    fn test_missing_value_sorts_last() {
        let mut resources = vec![item("1", "a", None), item("2", "b", Some("x"))];
        let criteria = parse_sort_criteria("+upnp:artist").unwrap();
        sort_resources(&mut resources, &criteria);
        assert_eq!(resources[0].id(), "2");
    }

    #[test]
    fn test_empty_criteria_preserves_order() {
        let mut resources = vec![item("9", "z", None), item("1", "a", None)];
        sort_resources(&mut resources, &[]);
        assert_eq!(resources[0].id(), "9");
    }

    #[test]
    fn test_sort_method_title_and_modified() {
        let mut resources = vec![
            StoreResource::Container(StoreContainer::new("c", Some("0"), "Zeta")),
            item("1", "alpha", None),
        ];
        sort_resources_by_method(&mut resources, SortMethod::Title);
        assert_eq!(resources[0].title(), "alpha");
    }
}
