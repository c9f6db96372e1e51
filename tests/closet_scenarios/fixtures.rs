//! Shared wardrobe fixtures.

use closet_store::closet::{Closet, ClothingItem, ClothingItemPatch};
use closet_store::{ClosetConfig, InMemoryBackend};

pub fn empty_closet() -> (InMemoryBackend, Closet<InMemoryBackend>) {
    let backend = InMemoryBackend::new();
    let closet = Closet::open(backend.clone(), &ClosetConfig::default().without_seed()).unwrap();
    (backend, closet)
}

pub fn item(name: &str, category: &str) -> ClothingItemPatch {
    ClothingItemPatch::default().name(name).category(category)
}

/// Five items across Tops, Bottoms and Shoes, Tops first.
pub fn stock(closet: &Closet<InMemoryBackend>) -> Vec<ClothingItem> {
    [
        ("White T-Shirt", "Tops"),
        ("Striped Shirt", "Tops"),
        ("Blue Jeans", "Bottoms"),
        ("Sneakers", "Shoes"),
        ("Black Tank", "Tops"),
    ]
    .into_iter()
    .map(|(name, category)| closet.add_item(item(name, category)).unwrap())
    .collect()
}
