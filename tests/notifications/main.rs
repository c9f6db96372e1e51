//! Change notification across the closet's shared notifier.

use std::sync::{Arc, Mutex};

use closet_store::closet::{Closet, ClothingItemPatch, OutfitPatch};
use closet_store::{ChangeEvent, ChangeKind, ClosetConfig, InMemoryBackend};

fn closet() -> Arc<Closet<InMemoryBackend>> {
    Arc::new(Closet::open(InMemoryBackend::new(), &ClosetConfig::default().without_seed()).unwrap())
}

#[test]
fn subscriber_sees_committed_state() {
    let closet = closet();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let reader = Arc::clone(&closet);
    let sink = Arc::clone(&seen);
    closet.notifier().subscribe("closetItems", move |event: &ChangeEvent| {
        // Store lock is released before callbacks run
        let count = reader.items().len().unwrap();
        sink.lock().unwrap().push((event.kind, count));
    });

    let item = closet
        .items()
        .create(ClothingItemPatch::default().name("Tee"))
        .unwrap();
    closet.items().toggle_field(&item.id, "isFavorite").unwrap();
    closet.items().delete(&item.id).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (ChangeKind::Created, 1),
            (ChangeKind::Updated, 1),
            (ChangeKind::Deleted, 0),
        ]
    );
}

#[test]
fn subscriptions_are_per_collection() {
    let closet = closet();
    let outfit_events = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&outfit_events);
    let subscription = closet.notifier().subscribe("outfits", move |event: &ChangeEvent| {
        sink.lock().unwrap().push(event.clone());
    });

    closet
        .items()
        .create(ClothingItemPatch::default().name("Tee"))
        .unwrap();
    let outfit = closet
        .outfits()
        .create(OutfitPatch::default().name("Brunch"))
        .unwrap();

    {
        let events = outfit_events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_deref(), Some(outfit.id.as_str()));
    }

    assert!(subscription.unsubscribe());
    closet.outfits().delete(&outfit.id).unwrap();
    assert_eq!(outfit_events.lock().unwrap().len(), 1);
}

#[test]
fn panicking_subscriber_does_not_block_others() {
    let closet = closet();
    let delivered = Arc::new(Mutex::new(0));

    closet
        .notifier()
        .subscribe("categories", |_event: &ChangeEvent| panic!("boom"));
    let counter = Arc::clone(&delivered);
    closet
        .notifier()
        .subscribe("categories", move |_event: &ChangeEvent| {
            *counter.lock().unwrap() += 1;
        });

    closet.add_category("Swimwear").unwrap();
    assert_eq!(*delivered.lock().unwrap(), 1);
    assert_eq!(closet.categories().len().unwrap(), 1);
}

#[test]
fn wipe_announces_cleared_collections() {
    let closet = closet();
    closet
        .items()
        .create(ClothingItemPatch::default().name("Tee"))
        .unwrap();

    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&kinds);
    closet.notifier().subscribe("closetItems", move |event: &ChangeEvent| {
        sink.lock().unwrap().push((event.kind, event.id.clone()));
    });

    closet.wipe().unwrap();
    assert_eq!(*kinds.lock().unwrap(), vec![(ChangeKind::Cleared, None)]);
}
