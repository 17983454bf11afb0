use std::sync::Arc;
use std::time::SystemTime;

use omsmediaserver::ContentDirectoryService;
use omsstore::{
    Compatibility, MediaStore, MemoryStore, ROOT_ID, RendererProfile, StoreContainer, StoreItem,
    StoreResource, TranscodeEngine,
};

/// Store plat : n items compatibles "item-00".."item-NN" sous la racine.
fn flat_store(n: usize) -> Arc<MemoryStore> {
    let store = MemoryStore::new("Test Library");
    for i in 0..n {
        store.insert(StoreResource::Item(StoreItem::new(
            format!("item-{i:02}"),
            Some(ROOT_ID),
            format!("item-{i:02}"),
        )));
    }
    Arc::new(store)
}

fn service(store: Arc<MemoryStore>) -> ContentDirectoryService {
    ContentDirectoryService::new(store)
}

#[derive(Debug)]
struct FixedEngine(bool);

impl TranscodeEngine for FixedEngine {
    fn name(&self) -> &str {
        "fixed"
    }

    fn is_engine_compatible(&self, _renderer: &RendererProfile) -> bool {
        self.0
    }
}

#[tokio::test]
async fn test_scenario_first_page() {
    let service = service(flat_store(25));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 10, "+dc:title", &renderer)
        .await
        .unwrap();

    assert_eq!(response.number_returned, 10);
    assert_eq!(response.total_matches, 25);
    assert!(response.result.contains("id=\"item-00\""));
    assert!(response.result.contains("id=\"item-09\""));
    assert!(!response.result.contains("id=\"item-10\""));

    // ordre ascendant
    let first = response.result.find("id=\"item-00\"").unwrap();
    let last = response.result.find("id=\"item-09\"").unwrap();
    assert!(first < last);
}

#[tokio::test]
async fn test_scenario_last_partial_page() {
    let service = service(flat_store(25));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 20, 10, "", &renderer)
        .await
        .unwrap();

    assert_eq!(response.number_returned, 5);
    assert_eq!(response.total_matches, 25);
}

#[tokio::test]
async fn test_scenario_missing_object_is_a_fault() {
    let service = service(flat_store(3));
    let renderer = RendererProfile::new("tv");

    let err = service
        .browse("missing-id", "BrowseDirectChildren", "", 0, 10, "", &renderer)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), 701);
}

#[tokio::test]
async fn test_scenario_metadata_single_item() {
    let service = service(flat_store(25));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse("item-05", "BrowseMetadata", "", 0, 0, "", &renderer)
        .await
        .unwrap();

    assert_eq!(response.number_returned, 1);
    assert_eq!(response.total_matches, 1);
    assert!(response.result.contains("id=\"item-05\""));
    assert!(!response.result.contains("id=\"item-04\""));
}

#[tokio::test]
async fn test_metadata_on_missing_object_still_reports_one_match() {
    let service = service(flat_store(1));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse("missing-id", "BrowseMetadata", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 0);
    assert_eq!(response.total_matches, 1);
}

#[tokio::test]
async fn test_unbounded_request_returns_everything() {
    let service = service(flat_store(25));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 25);
    assert_eq!(response.total_matches, 25);
}

#[tokio::test]
async fn test_out_of_range_window_yields_empty_page() {
    let service = service(flat_store(25));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 100, 10, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 0);
    assert_eq!(response.total_matches, 25);
}

#[tokio::test]
async fn test_incompatible_items_counted_out_of_total() {
    let store = flat_store(2);
    let mut bad = StoreItem::new("bad-item", Some(ROOT_ID), "bad-item");
    bad.compatibility = Compatibility::Never;
    store.insert(StoreResource::Item(bad));
    let service = service(store);
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 2);
    assert_eq!(response.total_matches, 2);
    assert!(!response.result.contains("id=\"bad-item\""));
}

#[tokio::test]
async fn test_engine_incompatibility_filters_item() {
    let store = flat_store(1);
    let mut transcoded = StoreItem::new("trans", Some(ROOT_ID), "trans");
    transcoded.engine = Some(Arc::new(FixedEngine(false)));
    store.insert(StoreResource::Item(transcoded));
    let service = service(store);
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 1);
    assert!(!response.result.contains("id=\"trans\""));
}

#[tokio::test]
async fn test_transcode_folder_exposes_every_variant() {
    let store = MemoryStore::new("Test Library");
    let mut folder = StoreContainer::new("0$trans", Some(ROOT_ID), "#--TRANSCODE--#");
    folder.transcode_folder = true;
    store.insert(StoreResource::Container(folder));
    for (id, title) in [("v1", "track [copy]"), ("v2", "track [ffmpeg]")] {
        let mut variant = StoreItem::new(id, Some("0$trans"), title);
        variant.compatibility = Compatibility::Never;
        variant.in_transcode_folder = true;
        store.insert(StoreResource::Item(variant));
    }
    let service = service(Arc::new(store));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse("0$trans", "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 2);
    assert_eq!(response.total_matches, 2);
}

#[tokio::test]
async fn test_tree_hack_inflates_total_on_full_page() {
    let service = service(flat_store(25));
    let renderer = RendererProfile::new("ps3").with_tree_hack();

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 10, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 10);
    // 11 annoncés quand 10 sont demandés, pour forcer la page suivante
    assert_eq!(response.total_matches, 11);

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 20, 10, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 5);
    assert_eq!(response.total_matches, 31);
}

#[tokio::test]
async fn test_tree_hack_signals_end_of_list_with_starting_index() {
    let service = service(flat_store(25));
    let renderer = RendererProfile::new("ps3").with_tree_hack();

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 30, 10, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 0);
    assert_eq!(response.total_matches, 30);
}

#[tokio::test]
async fn test_identical_browses_are_idempotent() {
    let service = service(flat_store(12));
    let renderer = RendererProfile::new("tv");

    let a = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 5, "+dc:title", &renderer)
        .await
        .unwrap();
    let b = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 5, "+dc:title", &renderer)
        .await
        .unwrap();

    assert_eq!(a.result, b.result);
    assert_eq!(a.number_returned, b.number_returned);
    assert_eq!(a.total_matches, b.total_matches);
    assert_eq!(a.update_id, b.update_id);
}

#[tokio::test]
async fn test_invalid_sort_criteria_rejected_before_tree_access() {
    let service = service(flat_store(3));
    let renderer = RendererProfile::new("tv");

    // la cible n'existe pas, mais le tri invalide doit primer sur 701
    let err = service
        .browse("missing-id", "BrowseDirectChildren", "", 0, 10, "+x:unknown", &renderer)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), 709);

    let err = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 10, "dc:title", &renderer)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), 709);
}

#[tokio::test]
async fn test_empty_sort_criteria_preserves_tree_order() {
    let store = MemoryStore::new("Test Library");
    for (id, title) in [("a", "Zebra"), ("b", "Alpha"), ("c", "Mango")] {
        store.insert(StoreResource::Item(StoreItem::new(id, Some(ROOT_ID), title)));
    }
    let service = service(Arc::new(store));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    let zebra = response.result.find("Zebra").unwrap();
    let alpha = response.result.find("Alpha").unwrap();
    let mango = response.result.find("Mango").unwrap();
    assert!(zebra < alpha && alpha < mango);
}

#[tokio::test]
async fn test_sorted_browse_orders_by_title() {
    let store = MemoryStore::new("Test Library");
    for (id, title) in [("a", "Zebra"), ("b", "Alpha"), ("c", "Mango")] {
        store.insert(StoreResource::Item(StoreItem::new(id, Some(ROOT_ID), title)));
    }
    let service = service(Arc::new(store));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "+dc:title", &renderer)
        .await
        .unwrap();
    let alpha = response.result.find("Alpha").unwrap();
    let mango = response.result.find("Mango").unwrap();
    let zebra = response.result.find("Zebra").unwrap();
    assert!(alpha < mango && mango < zebra);
}

#[tokio::test]
async fn test_response_snapshots_update_id() {
    let service = service(flat_store(2));
    let renderer = RendererProfile::new("tv");

    let before = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    assert_eq!(before.update_id, 1);

    // le scanner incrémente le compteur à chaque mutation de l'arbre
    service.system_update_id().bump();

    let after = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    assert_eq!(after.update_id, 2);
}

#[tokio::test]
async fn test_stale_playlist_is_rematerialized_during_browse() {
    let store = Arc::new(MemoryStore::new("Test Library"));
    let backing = tempfile::NamedTempFile::new().unwrap();
    let mut playlist = StoreContainer::new("pl", Some(ROOT_ID), "Morning mix");
    playlist.playlist_source = Some(backing.path().to_path_buf());
    playlist.last_modified = SystemTime::UNIX_EPOCH;
    store.insert(StoreResource::Container(playlist));

    let service = service(store.clone());
    let renderer = RendererProfile::new("tv");
    service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();

    let refreshed = store.get_resource("pl").await.unwrap();
    assert!(refreshed.last_modified() > SystemTime::UNIX_EPOCH);
}

#[tokio::test]
async fn test_payload_keeps_titles_escaped_once() {
    let store = MemoryStore::new("Test Library");
    let mut item = StoreItem::new("amp", Some(ROOT_ID), "AC & DC <Live>");
    item.uri = Some("http://host/stream?id=amp&fmt=flac".to_string());
    store.insert(StoreResource::Item(item));
    let service = service(Arc::new(store));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse(ROOT_ID, "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();

    // le payload traverse l'enveloppe SOAP en étant échappé exactement
    // une fois
    assert!(response.result.contains("AC &amp; DC &lt;Live&gt;"));
    assert!(response.result.contains("id=amp&amp;fmt=flac"));
    assert!(!response.result.contains("<Live>"));
    assert!(!response.result.contains("&amp;amp;"));
}

#[tokio::test]
async fn test_empty_object_id_defaults_to_root() {
    let service = service(flat_store(3));
    let renderer = RendererProfile::new("tv");

    let response = service
        .browse("", "BrowseDirectChildren", "", 0, 0, "", &renderer)
        .await
        .unwrap();
    assert_eq!(response.number_returned, 3);
}

#[tokio::test]
async fn test_returned_count_never_exceeds_requested() {
    let service = service(flat_store(7));
    let renderer = RendererProfile::new("tv");

    for (start, count) in [(0u32, 3u32), (5, 5), (6, 1), (7, 2), (0, 0)] {
        let response = service
            .browse(ROOT_ID, "BrowseDirectChildren", "", start, count, "", &renderer)
            .await
            .unwrap();
        let expected = if count == 0 {
            7u32.saturating_sub(start)
        } else {
            count.min(7u32.saturating_sub(start))
        };
        assert_eq!(response.number_returned, expected);
        assert_eq!(response.total_matches, 7);
    }
}
