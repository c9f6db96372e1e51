//! End-to-end wardrobe scenarios over the in-memory backend.

mod fixtures;

use closet_store::closet::{ClosetError, ClothingItem, OutfitPatch};
use closet_store::{
    group_by, Closet, ClosetConfig, InMemoryBackend, KeyValueBackend, Record, StoreError,
};
use fixtures::{empty_closet, item, stock};

#[test]
fn create_returns_stamped_record() {
    let (backend, closet) = empty_closet();

    let shirt = closet
        .items()
        .create(item("White T-Shirt", "Tops").color("White"))
        .unwrap();

    assert!(!shirt.id.is_empty());
    assert_eq!(shirt.created_at, shirt.updated_at);
    assert_eq!(closet.items().get_all().unwrap(), vec![shirt.clone()]);

    // Written through before create returned
    let blob = backend.get(ClothingItem::COLLECTION).unwrap().unwrap();
    assert!(blob.contains("White T-Shirt"));
}

#[test]
fn toggle_needs_washing_round_trip() {
    let (_, closet) = empty_closet();
    let shirt = closet.add_item(item("White T-Shirt", "Tops")).unwrap();
    assert!(!shirt.needs_washing);

    let dirty = closet.items().toggle_field(&shirt.id, "needsWashing").unwrap();
    assert!(dirty.needs_washing);

    let clean = closet.items().toggle_field(&shirt.id, "needsWashing").unwrap();
    assert!(!clean.needs_washing);
    assert!(clean.updated_at >= clean.created_at);
}

#[test]
fn bottoms_category_deletes_only_when_empty() {
    let (_, closet) = empty_closet();
    closet.add_category("Tops").unwrap();
    let bottoms = closet.add_category("Bottoms").unwrap();
    closet.add_item(item("White T-Shirt", "Tops")).unwrap();
    let jeans = closet.add_item(item("Blue Jeans", "Bottoms")).unwrap();

    let stored = closet.categories().get_by_id(&bottoms.id).unwrap().unwrap();
    assert_eq!(stored.count, 1);

    // The store itself has no opinion; the closet refuses
    assert!(matches!(
        closet.delete_category(&bottoms.id),
        Err(ClosetError::CategoryInUse { count: 1, .. })
    ));

    closet.delete_item(&jeans.id).unwrap();
    let counts = closet.category_counts().unwrap();
    assert_eq!(counts.get("Bottoms"), None);
    let stored = closet.categories().get_by_id(&bottoms.id).unwrap().unwrap();
    assert_eq!(stored.count, 0);

    assert!(closet.delete_category(&bottoms.id).unwrap());
}

#[test]
fn group_by_category_follows_first_appearance() {
    let (_, closet) = empty_closet();
    stock(&closet);

    let items = closet.items().get_all().unwrap();
    let groups = group_by(&items, |i| i.category.clone());

    let summary: Vec<(&str, Vec<&str>)> = groups
        .iter()
        .map(|(category, members)| {
            (
                category.as_str(),
                members.iter().map(|i| i.name.as_str()).collect(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Tops", vec!["White T-Shirt", "Striped Shirt", "Black Tank"]),
            ("Bottoms", vec!["Blue Jeans"]),
            ("Shoes", vec!["Sneakers"]),
        ]
    );
    assert_eq!(closet.items_by_category().unwrap(), groups);
}

#[test]
fn corrupt_outfits_blob_is_reported() {
    let (backend, closet) = empty_closet();
    let outfit = closet
        .outfits()
        .create(OutfitPatch::default().name("Casual Friday"))
        .unwrap();

    backend.set("outfits", r#"{"not":"a list"}"#).unwrap();

    let err = closet.outfits().load().unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { ref collection, .. } if collection == "outfits"));
    // Previously loaded outfits are still there
    assert_eq!(closet.outfits().get_all().unwrap(), vec![outfit]);

    // Opening a fresh closet over the same data refuses too
    assert!(matches!(
        Closet::open(backend, &ClosetConfig::default()),
        Err(ClosetError::Store(StoreError::Corrupt { .. }))
    ));
}

#[test]
fn reopen_sees_previous_writes() {
    let backend = InMemoryBackend::new();
    let first = Closet::open(backend.clone(), &ClosetConfig::default()).unwrap();
    let shirt = first.add_item(item("White T-Shirt", "Tops")).unwrap();
    first.items().toggle_field(&shirt.id, "isFavorite").unwrap();

    let second = Closet::open(backend, &ClosetConfig::default()).unwrap();
    assert_eq!(second.favorite_count().unwrap(), 1);
    // Seeding only happens once
    assert_eq!(second.categories().len().unwrap(), closet_store::DEFAULT_CATEGORIES.len());
    let tops = second.categories().find(|c| c.name == "Tops").unwrap();
    assert_eq!(tops[0].count, 1);
}

#[test]
fn reopen_after_delete_forgets_item() {
    let backend = InMemoryBackend::new();
    let first = Closet::open(backend.clone(), &ClosetConfig::default()).unwrap();
    let keep = first.add_item(item("Blue Jeans", "Bottoms")).unwrap();
    let gone = first.add_item(item("Old Hoodie", "Tops")).unwrap();
    assert!(first.delete_item(&gone.id).unwrap());

    let second = Closet::open(backend, &ClosetConfig::default()).unwrap();
    assert_eq!(second.items().get_by_id(&gone.id).unwrap(), None);
    assert_eq!(second.items().get_all().unwrap(), vec![keep]);
    let tops = second.categories().find(|c| c.name == "Tops").unwrap();
    assert_eq!(tops[0].count, 0);
}
