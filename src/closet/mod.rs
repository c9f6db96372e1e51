//! Wardrobe domain - the five collections plus consumer-level policies.
//!
//! ## Example
//!
//! ```ignore
//! use closet_store::closet::{Closet, ClothingItemPatch};
//! use closet_store::{ClosetConfig, InMemoryBackend};
//!
//! let closet = Closet::open(InMemoryBackend::new(), &ClosetConfig::default())?;
//! let shirt = closet.add_item(
//!     ClothingItemPatch::default().name("White T-Shirt").category("Tops"),
//! )?;
//! closet.items().toggle_field(&shirt.id, "needsWashing")?;
//! assert_eq!(closet.laundry()?.len(), 1);
//! ```

mod models;
mod session;

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::backend::{BackendError, FileBackend, KeyValueBackend};
use crate::codec::{CollectionCodec, JsonCodec};
use crate::config::{ClosetConfig, ConfigError, DEFAULT_CATEGORIES};
use crate::notify::ChangeNotifier;
use crate::record::FieldValue;
use crate::store::{LocalCollectionStore, StoreError};
use crate::views::{self, SortDirection};

pub use models::{
    Category, CategoryPatch, ClothingItem, ClothingItemPatch, Measurement, MeasurementKind,
    MeasurementPatch, Outfit, OutfitPatch, Priority, ShoppingSchedule, ShoppingSchedulePatch,
    User,
};
pub use session::UserSession;

/// Fields searched by [`Closet::search_items`].
pub const ITEM_SEARCH_FIELDS: &[&str] = &[
    "name", "type", "category", "color", "brand", "material", "tags",
];

/// Error type for closet-level operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosetError {
    Store(StoreError),
    Config(ConfigError),
    /// Category still has items; deletion is refused.
    CategoryInUse { name: String, count: usize },
    DuplicateCategory(String),
    EmptyCategoryName,
}

impl fmt::Display for ClosetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClosetError::Store(err) => write!(f, "{}", err),
            ClosetError::Config(err) => write!(f, "{}", err),
            ClosetError::CategoryInUse { name, count } => write!(
                f,
                "category {} still has {} item(s) and cannot be deleted",
                name, count
            ),
            ClosetError::DuplicateCategory(name) => write!(f, "category {} already exists", name),
            ClosetError::EmptyCategoryName => write!(f, "category name cannot be empty"),
        }
    }
}

impl std::error::Error for ClosetError {}

impl From<StoreError> for ClosetError {
    fn from(err: StoreError) -> Self {
        ClosetError::Store(err)
    }
}

impl From<ConfigError> for ClosetError {
    fn from(err: ConfigError) -> Self {
        ClosetError::Config(err)
    }
}

impl From<BackendError> for ClosetError {
    fn from(err: BackendError) -> Self {
        ClosetError::Store(StoreError::Backend(err))
    }
}

/// All wardrobe collections over one backend, sharing one notifier.
pub struct Closet<B, C = JsonCodec> {
    backend: B,
    notifier: ChangeNotifier,
    items: LocalCollectionStore<ClothingItem, B, C>,
    outfits: LocalCollectionStore<Outfit, B, C>,
    categories: LocalCollectionStore<Category, B, C>,
    measurements: LocalCollectionStore<Measurement, B, C>,
    schedules: LocalCollectionStore<ShoppingSchedule, B, C>,
    session: UserSession<B, C>,
}

impl Closet<FileBackend, JsonCodec> {
    /// Open a closet persisted under `config.data_dir`.
    pub fn open_dir(config: &ClosetConfig) -> Result<Self, ClosetError> {
        let dir = config
            .data_dir
            .as_ref()
            .ok_or(ConfigError::Missing("data_dir"))?;
        let backend = FileBackend::open(dir)?;
        Self::open(backend, config)
    }
}

impl<B: KeyValueBackend + Clone> Closet<B, JsonCodec> {
    /// Open a JSON-encoded closet over `backend`.
    pub fn open(backend: B, config: &ClosetConfig) -> Result<Self, ClosetError> {
        Self::open_with_codec(backend, JsonCodec, config)
    }
}

impl<B: KeyValueBackend + Clone, C: CollectionCodec + Clone> Closet<B, C> {
    /// Load every collection, seed default categories into a fresh backend
    /// (when configured) and recompute category counts from the items.
    pub fn open_with_codec(backend: B, codec: C, config: &ClosetConfig) -> Result<Self, ClosetError> {
        let notifier = ChangeNotifier::new();

        let closet = Closet {
            items: open_store(&backend, &codec, &notifier, config),
            outfits: open_store(&backend, &codec, &notifier, config),
            categories: open_store(&backend, &codec, &notifier, config),
            measurements: open_store(&backend, &codec, &notifier, config),
            schedules: open_store(&backend, &codec, &notifier, config),
            session: UserSession::with_codec(backend.clone(), codec),
            notifier,
            backend,
        };

        closet.items.load()?;
        closet.outfits.load()?;
        closet.categories.load()?;
        closet.measurements.load()?;
        closet.schedules.load()?;

        if config.seed_default_categories && closet.backend.get(closet.categories.key())?.is_none() {
            tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeding default categories");
            for name in DEFAULT_CATEGORIES {
                closet
                    .categories
                    .create(CategoryPatch::default().name(*name))?;
            }
        }

        closet.recount_categories()?;
        Ok(closet)
    }

    pub fn items(&self) -> &LocalCollectionStore<ClothingItem, B, C> {
        &self.items
    }

    pub fn outfits(&self) -> &LocalCollectionStore<Outfit, B, C> {
        &self.outfits
    }

    pub fn categories(&self) -> &LocalCollectionStore<Category, B, C> {
        &self.categories
    }

    pub fn measurements(&self) -> &LocalCollectionStore<Measurement, B, C> {
        &self.measurements
    }

    pub fn schedules(&self) -> &LocalCollectionStore<ShoppingSchedule, B, C> {
        &self.schedules
    }

    pub fn session(&self) -> &UserSession<B, C> {
        &self.session
    }

    /// Notifier shared by all five stores.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    // ------------------------------------------------------------------
    // Items (keep category counts in step)
    // ------------------------------------------------------------------

    pub fn add_item(&self, patch: ClothingItemPatch) -> Result<ClothingItem, ClosetError> {
        let item = self.items.create(patch)?;
        self.recount_categories()?;
        Ok(item)
    }

    pub fn update_item(&self, id: &str, patch: ClothingItemPatch) -> Result<ClothingItem, ClosetError> {
        let recount = patch.category.is_some();
        let item = self.items.update(id, patch)?;
        if recount {
            self.recount_categories()?;
        }
        Ok(item)
    }

    /// Delete an item. Outfits that reference it keep the dangling id.
    pub fn delete_item(&self, id: &str) -> Result<bool, ClosetError> {
        let removed = self.items.delete(id)?;
        if removed {
            self.recount_categories()?;
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// Item count per category name, derived from the items collection.
    pub fn category_counts(&self) -> Result<IndexMap<String, usize>, ClosetError> {
        let items = self.items.get_all()?;
        Ok(views::group_by(&items, |item| item.category.clone())
            .into_iter()
            .map(|(name, members)| (name, members.len()))
            .collect())
    }

    /// Overwrite each stored `count` that disagrees with the items.
    pub fn recount_categories(&self) -> Result<(), ClosetError> {
        let counts = self.category_counts()?;
        for category in self.categories.get_all()? {
            let derived = counts.get(&category.name).copied().unwrap_or(0) as u32;
            if category.count != derived {
                self.categories
                    .update(&category.id, CategoryPatch::default().count(derived))?;
            }
        }
        Ok(())
    }

    /// Add a category. Names are unique, compared case-insensitively.
    pub fn add_category(&self, name: &str) -> Result<Category, ClosetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClosetError::EmptyCategoryName);
        }
        let lowered = name.to_lowercase();
        if self.categories.count(|c| c.name.to_lowercase() == lowered)? > 0 {
            return Err(ClosetError::DuplicateCategory(name.to_string()));
        }

        let count = self.category_counts()?.get(name).copied().unwrap_or(0) as u32;
        Ok(self
            .categories
            .create(CategoryPatch::default().name(name).count(count))?)
    }

    /// Delete a category that has no items. Returns false for unknown ids.
    pub fn delete_category(&self, id: &str) -> Result<bool, ClosetError> {
        let Some(category) = self.categories.get_by_id(id)? else {
            return Ok(false);
        };

        let count = self
            .category_counts()?
            .get(&category.name)
            .copied()
            .unwrap_or(0);
        if count > 0 {
            return Err(ClosetError::CategoryInUse {
                name: category.name,
                count,
            });
        }

        Ok(self.categories.delete(id)?)
    }

    // ------------------------------------------------------------------
    // Item views
    // ------------------------------------------------------------------

    pub fn search_items(&self, query: &str) -> Result<Vec<ClothingItem>, ClosetError> {
        let items = self.items.get_all()?;
        Ok(views::filter_by_text(&items, query, ITEM_SEARCH_FIELDS))
    }

    pub fn items_in_category(&self, category: &str) -> Result<Vec<ClothingItem>, ClosetError> {
        let items = self.items.get_all()?;
        Ok(views::filter_by_field(&items, "category", &FieldValue::Text(category)))
    }

    pub fn items_by_category(&self) -> Result<IndexMap<String, Vec<ClothingItem>>, ClosetError> {
        let items = self.items.get_all()?;
        Ok(views::group_by(&items, |item| item.category.clone()))
    }

    pub fn favorites(&self) -> Result<Vec<ClothingItem>, ClosetError> {
        let items = self.items.get_all()?;
        Ok(views::filter_by_field(&items, "isFavorite", &FieldValue::Bool(true)))
    }

    pub fn favorite_count(&self) -> Result<usize, ClosetError> {
        let items = self.items.get_all()?;
        Ok(views::aggregate_count(&items, |item| item.is_favorite))
    }

    /// Items flagged as needing a wash.
    pub fn laundry(&self) -> Result<Vec<ClothingItem>, ClosetError> {
        let items = self.items.get_all()?;
        Ok(views::filter_by_field(&items, "needsWashing", &FieldValue::Bool(true)))
    }

    // ------------------------------------------------------------------
    // Outfit views
    // ------------------------------------------------------------------

    /// Items of an outfit in outfit order. Ids that no longer resolve are skipped.
    pub fn outfit_items(&self, outfit_id: &str) -> Result<Vec<ClothingItem>, ClosetError> {
        let outfit = self
            .outfits
            .get_by_id(outfit_id)?
            .ok_or_else(|| StoreError::NotFound {
                collection: self.outfits.key().to_string(),
                id: outfit_id.to_string(),
            })?;
        let items = self.items.get_all()?;

        Ok(outfit
            .items
            .iter()
            .filter_map(|id| items.iter().find(|item| &item.id == id).cloned())
            .collect())
    }

    /// Outfits grouped by `YYYY-MM` of last wear (creation when never worn),
    /// newest month first.
    pub fn outfits_by_month(&self) -> Result<IndexMap<String, Vec<Outfit>>, ClosetError> {
        let outfits = self.outfits.get_all()?;
        let newest_first = views::sort_by(&outfits, outfit_date, SortDirection::Descending);
        Ok(views::group_by(&newest_first, |outfit| {
            views::month_key(&outfit_date(outfit)).unwrap_or_else(|| "undated".to_string())
        }))
    }

    // ------------------------------------------------------------------
    // Shopping views
    // ------------------------------------------------------------------

    /// Schedules grouped by month of their date, in date order.
    pub fn schedules_by_month(&self) -> Result<IndexMap<String, Vec<ShoppingSchedule>>, ClosetError> {
        let schedules = self.schedules.get_all()?;
        let by_date = views::sort_by(&schedules, |s| s.date, SortDirection::Ascending);
        Ok(views::group_by(&by_date, |s| s.date.format("%Y-%m").to_string()))
    }

    /// Schedules on or after `today`, soonest first.
    pub fn upcoming_schedules(&self, today: NaiveDate) -> Result<Vec<ShoppingSchedule>, ClosetError> {
        let upcoming = self.schedules.find(|s| s.date >= today)?;
        Ok(views::sort_by(&upcoming, |s| s.date, SortDirection::Ascending))
    }

    pub fn budget_total(&self) -> Result<f64, ClosetError> {
        Ok(self.schedules.get_all()?.iter().map(|s| s.budget).sum())
    }

    // ------------------------------------------------------------------
    // Measurements
    // ------------------------------------------------------------------

    pub fn measurements_by_kind(
        &self,
    ) -> Result<IndexMap<MeasurementKind, Vec<Measurement>>, ClosetError> {
        let measurements = self.measurements.get_all()?;
        Ok(views::group_by(&measurements, |m| m.kind))
    }

    // ------------------------------------------------------------------
    // Bulk
    // ------------------------------------------------------------------

    /// Clear every collection and sign out.
    pub fn wipe(&self) -> Result<(), ClosetError> {
        self.items.clear()?;
        self.outfits.clear()?;
        self.categories.clear()?;
        self.measurements.clear()?;
        self.schedules.clear()?;
        self.session.sign_out()?;
        Ok(())
    }
}

fn open_store<R, B, C>(
    backend: &B,
    codec: &C,
    notifier: &ChangeNotifier,
    config: &ClosetConfig,
) -> LocalCollectionStore<R, B, C>
where
    R: crate::Record,
    B: KeyValueBackend + Clone,
    C: CollectionCodec + Clone,
{
    LocalCollectionStore::new(backend.clone())
        .with_codec(codec.clone())
        .with_notifier(notifier.clone())
        .with_options(config.store)
}

fn outfit_date(outfit: &Outfit) -> String {
    outfit
        .last_worn
        .clone()
        .unwrap_or_else(|| outfit.created_at.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    fn closet() -> Closet<InMemoryBackend> {
        Closet::open(InMemoryBackend::new(), &ClosetConfig::default()).unwrap()
    }

    fn item(name: &str, category: &str) -> ClothingItemPatch {
        ClothingItemPatch::default().name(name).category(category)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fresh_backend_is_seeded() {
        let closet = closet();
        let names: Vec<String> = closet
            .categories()
            .get_all()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, DEFAULT_CATEGORIES);
        assert!(closet.items().is_empty().unwrap());
    }

    #[test]
    fn seeding_skipped_when_disabled_or_key_present() {
        let backend = InMemoryBackend::new();
        let closet = Closet::open(backend.clone(), &ClosetConfig::default().without_seed()).unwrap();
        assert!(closet.categories().is_empty().unwrap());

        backend.set("categories", "[]").unwrap();
        let closet = Closet::open(backend, &ClosetConfig::default()).unwrap();
        assert!(closet.categories().is_empty().unwrap());
    }

    #[test]
    fn open_recounts_stale_counts() {
        let backend = InMemoryBackend::new();
        backend
            .set("categories", r#"[{"id":"c1","name":"Tops","count":7}]"#)
            .unwrap();
        backend
            .set("closetItems", r#"[{"id":"i1","name":"Tee","category":"Tops"}]"#)
            .unwrap();

        let closet = Closet::open(backend, &ClosetConfig::default()).unwrap();
        let tops = closet.categories().get_by_id("c1").unwrap().unwrap();
        assert_eq!(tops.count, 1);
    }

    #[test]
    fn item_mutations_keep_counts_current() {
        let closet = closet();
        let tee = closet.add_item(item("Tee", "Tops")).unwrap();
        closet.add_item(item("Jeans", "Bottoms")).unwrap();

        let count_of = |name: &str| {
            closet
                .categories()
                .find(|c| c.name == name)
                .unwrap()
                .first()
                .map(|c| c.count)
        };
        assert_eq!(count_of("Tops"), Some(1));

        closet
            .update_item(&tee.id, ClothingItemPatch::default().category("Outerwear"))
            .unwrap();
        assert_eq!(count_of("Tops"), Some(0));
        assert_eq!(count_of("Outerwear"), Some(1));

        assert!(closet.delete_item(&tee.id).unwrap());
        assert_eq!(count_of("Outerwear"), Some(0));
        assert!(!closet.delete_item(&tee.id).unwrap());
    }

    #[test]
    fn add_category_rejects_duplicates_and_blanks() {
        let closet = closet();
        assert_eq!(
            closet.add_category("tops"),
            Err(ClosetError::DuplicateCategory("tops".into()))
        );
        assert_eq!(closet.add_category("   "), Err(ClosetError::EmptyCategoryName));

        let swim = closet.add_category(" Swimwear ").unwrap();
        assert_eq!(swim.name, "Swimwear");
        assert_eq!(swim.count, 0);
    }

    #[test]
    fn add_category_counts_existing_items() {
        let closet = closet();
        closet.add_item(item("Trunks", "Swimwear")).unwrap();
        let swim = closet.add_category("Swimwear").unwrap();
        assert_eq!(swim.count, 1);
    }

    #[test]
    fn delete_category_is_count_gated() {
        let closet = closet();
        let shirt = closet.add_item(item("Shirt", "Tops")).unwrap();
        let tops = closet.categories().find(|c| c.name == "Tops").unwrap().remove(0);

        assert_eq!(
            closet.delete_category(&tops.id),
            Err(ClosetError::CategoryInUse {
                name: "Tops".into(),
                count: 1
            })
        );

        closet.delete_item(&shirt.id).unwrap();
        assert!(closet.delete_category(&tops.id).unwrap());
        assert!(!closet.delete_category(&tops.id).unwrap());
    }

    #[test]
    fn outfit_items_skip_dangling_ids() {
        let closet = closet();
        let tee = closet.add_item(item("Tee", "Tops")).unwrap();
        let jeans = closet.add_item(item("Jeans", "Bottoms")).unwrap();
        let outfit = closet
            .outfits()
            .create(OutfitPatch::default().name("Casual").items(vec![
                jeans.id.clone(),
                "gone".to_string(),
                tee.id.clone(),
            ]))
            .unwrap();

        let resolved: Vec<String> = closet
            .outfit_items(&outfit.id)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(resolved, vec!["Jeans", "Tee"]);

        assert!(matches!(
            closet.outfit_items("missing"),
            Err(ClosetError::Store(StoreError::NotFound { .. }))
        ));
    }

    #[test]
    fn search_covers_brand_and_tags() {
        let closet = closet();
        closet
            .add_item(item("Runner", "Shoes").brand("Nike"))
            .unwrap();
        closet
            .add_item(item("Parka", "Outerwear").tags(vec!["winter".to_string()]))
            .unwrap();

        assert_eq!(closet.search_items("nike").unwrap()[0].name, "Runner");
        assert_eq!(closet.search_items("WINTER").unwrap()[0].name, "Parka");
        assert_eq!(closet.search_items("").unwrap().len(), 2);
    }

    #[test]
    fn favorites_and_laundry() {
        let closet = closet();
        let tee = closet.add_item(item("Tee", "Tops")).unwrap();
        closet.add_item(item("Jeans", "Bottoms")).unwrap();

        closet.items().toggle_field(&tee.id, "isFavorite").unwrap();
        closet.items().toggle_field(&tee.id, "needsWashing").unwrap();

        assert_eq!(closet.favorite_count().unwrap(), 1);
        assert_eq!(closet.favorites().unwrap()[0].id, tee.id);
        assert_eq!(closet.laundry().unwrap()[0].id, tee.id);
        assert_eq!(closet.items_in_category("Bottoms").unwrap().len(), 1);
    }

    #[test]
    fn outfits_grouped_by_month_newest_first() {
        let closet = closet();
        closet
            .outfits()
            .create(OutfitPatch::default().name("May").last_worn(Some("2024-05-03".to_string())))
            .unwrap();
        closet
            .outfits()
            .create(OutfitPatch::default().name("July").last_worn(Some("2024-07-20".to_string())))
            .unwrap();
        closet
            .outfits()
            .create(OutfitPatch::default().name("Also May").last_worn(Some("2024-05-28".to_string())))
            .unwrap();

        let months = closet.outfits_by_month().unwrap();
        let keys: Vec<&String> = months.keys().collect();
        assert_eq!(keys, vec!["2024-07", "2024-05"]);
        assert_eq!(months["2024-05"][0].name, "Also May");
    }

    #[test]
    fn shopping_views() {
        let closet = closet();
        let plans = [
            ("Boots", date(2024, 11, 20), 120.0),
            ("Scarf", date(2024, 10, 5), 30.5),
            ("Coat", date(2024, 11, 2), 200.0),
        ];
        for (name, day, budget) in plans {
            let patch = ShoppingSchedulePatch::default()
                .item_name(name)
                .date(day)
                .budget(budget);
            closet.schedules().create(patch).unwrap();
        }

        let months = closet.schedules_by_month().unwrap();
        let keys: Vec<&String> = months.keys().collect();
        assert_eq!(keys, vec!["2024-10", "2024-11"]);
        assert_eq!(months["2024-11"][0].item_name, "Coat");

        let upcoming: Vec<String> = closet
            .upcoming_schedules(date(2024, 11, 2))
            .unwrap()
            .into_iter()
            .map(|s| s.item_name)
            .collect();
        assert_eq!(upcoming, vec!["Coat", "Boots"]);

        assert_eq!(closet.budget_total().unwrap(), 350.5);
    }

    #[test]
    fn measurements_grouped_by_kind() {
        let closet = closet();
        closet
            .measurements()
            .create(MeasurementPatch::default().kind(MeasurementKind::Shoes).name("EU").value(42.0))
            .unwrap();
        closet
            .measurements()
            .create(MeasurementPatch::default().name("Chest").value(96.0))
            .unwrap();

        let groups = closet.measurements_by_kind().unwrap();
        let kinds: Vec<&MeasurementKind> = groups.keys().collect();
        assert_eq!(kinds, vec![&MeasurementKind::Shoes, &MeasurementKind::Clothes]);
    }

    #[test]
    fn wipe_clears_everything() {
        let backend = InMemoryBackend::new();
        let closet = Closet::open(backend.clone(), &ClosetConfig::default()).unwrap();
        closet.add_item(item("Tee", "Tops")).unwrap();
        closet
            .session()
            .sign_in(&User::new("Ada", "ada@example.com", "google"))
            .unwrap();

        closet.wipe().unwrap();

        assert!(closet.items().is_empty().unwrap());
        assert!(closet.categories().is_empty().unwrap());
        assert!(!closet.session().is_signed_in().unwrap());
        assert!(backend.keys().is_empty());
    }

    #[test]
    fn open_dir_requires_data_dir() {
        assert!(matches!(
            Closet::open_dir(&ClosetConfig::default()),
            Err(ClosetError::Config(ConfigError::Missing("data_dir")))
        ));
    }
}
