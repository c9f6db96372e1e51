//! Durability across restarts and alternate codecs.

use chrono::NaiveDate;
use closet_store::closet::{
    Closet, ClothingItem, ClothingItemPatch, Priority, ShoppingSchedulePatch, User,
};
use closet_store::{
    BackendError, BitcodeCodec, ClosetConfig, FileBackend, InMemoryBackend, KeyValueBackend,
    LocalCollectionStore, StoreError, StoreOptions, WritePolicy,
};
use tempfile::TempDir;

#[test]
fn file_backed_closet_survives_restart() {
    let dir = TempDir::new().unwrap();
    let config = ClosetConfig::default().with_data_dir(dir.path());

    let shirt_id = {
        let closet = Closet::open_dir(&config).unwrap();
        let shirt = closet
            .add_item(ClothingItemPatch::default().name("Linen Shirt").category("Tops"))
            .unwrap();
        closet
            .session()
            .sign_in(&User::new("Ada", "ada@example.com", "apple"))
            .unwrap();
        shirt.id
    };

    let closet = Closet::open_dir(&config).unwrap();
    let shirt = closet.items().get_by_id(&shirt_id).unwrap().unwrap();
    assert_eq!(shirt.name, "Linen Shirt");
    assert_eq!(
        closet.session().current_user().unwrap().map(|u| u.email),
        Some("ada@example.com".to_string())
    );
    assert!(dir.path().join("closetItems.store").exists());
}

#[test]
fn bitcode_closet_round_trips() {
    let backend = InMemoryBackend::new();
    let config = ClosetConfig::default();
    let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();

    {
        let closet = Closet::open_with_codec(backend.clone(), BitcodeCodec, &config).unwrap();
        closet
            .add_item(
                ClothingItemPatch::default()
                    .name("Wool Coat")
                    .category("Outerwear")
                    .tags(vec!["winter".to_string()]),
            )
            .unwrap();
        closet
            .schedules()
            .create(
                ShoppingSchedulePatch::default()
                    .item_name("Gloves")
                    .date(date)
                    .priority(Priority::High),
            )
            .unwrap();
    }

    // Blobs are base64 text, not JSON
    let blob = backend.get("closetItems").unwrap().unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&blob).is_err());

    let closet = Closet::open_with_codec(backend, BitcodeCodec, &config).unwrap();
    let coat = &closet.search_items("winter").unwrap()[0];
    assert_eq!(coat.name, "Wool Coat");
    let gloves = &closet.upcoming_schedules(date).unwrap()[0];
    assert_eq!(gloves.priority, Priority::High);
}

#[test]
fn write_then_commit_leaves_memory_matching_backend() {
    // Room for a couple of records only
    let backend = InMemoryBackend::new().with_quota(500);
    let store: LocalCollectionStore<ClothingItem, _> = LocalCollectionStore::new(backend.clone());

    store
        .create(ClothingItemPatch::default().name("Tee"))
        .unwrap();

    let mut last_err = None;
    for n in 0..10 {
        match store.create(ClothingItemPatch::default().name(format!("Item {}", n))) {
            Ok(_) => {}
            Err(err) => {
                last_err = Some(err);
                break;
            }
        }
    }
    assert!(matches!(
        last_err,
        Some(StoreError::Backend(BackendError::QuotaExceeded { .. }))
    ));

    // A fresh store reading the backend sees exactly what memory has
    let reread: LocalCollectionStore<ClothingItem, _> = LocalCollectionStore::new(backend);
    assert_eq!(reread.get_all().unwrap(), store.get_all().unwrap());
}

#[test]
fn optimistic_policy_keeps_memory_ahead_on_failure() {
    let backend = InMemoryBackend::new();
    let store: LocalCollectionStore<ClothingItem, _> = LocalCollectionStore::new(backend.clone())
        .with_options(StoreOptions::default().with_write_policy(WritePolicy::Optimistic));

    store.load().unwrap();
    backend.set_available(false);
    let err = store
        .create(ClothingItemPatch::default().name("Tee"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Backend(BackendError::Unavailable(_))));
    assert_eq!(store.len().unwrap(), 1);

    backend.set_available(true);
    store.load().unwrap();
    assert!(store.is_empty().unwrap());
}

#[test]
fn file_backend_clear_all_keeps_foreign_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

    let backend = FileBackend::open(dir.path()).unwrap();
    backend.set("outfits", "[]").unwrap();
    backend.clear_all().unwrap();

    assert_eq!(backend.get("outfits").unwrap(), None);
    assert!(dir.path().join("notes.txt").exists());
}
