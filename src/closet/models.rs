//! Persisted wardrobe records. Field names match the stored JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{AsField, FieldValue, Timestamp};
use crate::Record;

/// A single piece of clothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase", default)]
#[record(collection = "closetItems")]
pub struct ClothingItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub color: String,
    pub size: String,
    pub brand: String,
    pub material: String,
    pub tags: Vec<String>,
    /// Image URL.
    pub image: String,
    pub notes: String,
    #[record(flag)]
    pub is_favorite: bool,
    #[record(flag)]
    pub needs_washing: bool,
    /// ISO instant or `YYYY-MM-DD`, as entered.
    pub last_worn: Option<String>,
    #[record(created_at)]
    #[serde(with = "crate::record::timestamp")]
    pub created_at: Timestamp,
    #[record(updated_at)]
    #[serde(with = "crate::record::timestamp")]
    pub updated_at: Timestamp,
}

/// A named combination of clothing items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase", default)]
#[record(collection = "outfits")]
pub struct Outfit {
    pub id: String,
    pub name: String,
    /// ClothingItem ids. May reference deleted items.
    pub items: Vec<String>,
    pub occasion: String,
    pub weather: String,
    pub tags: Vec<String>,
    pub image: String,
    pub description: String,
    pub last_worn: Option<String>,
    #[record(created_at)]
    #[serde(with = "crate::record::timestamp")]
    pub created_at: Timestamp,
    #[record(updated_at)]
    #[serde(with = "crate::record::timestamp")]
    pub updated_at: Timestamp,
}

/// A clothing category. `count` is a cached view recomputed from the items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Record)]
#[serde(default)]
#[record(collection = "categories")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    #[default]
    Clothes,
    Shoes,
    Accessories,
}

impl MeasurementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::Clothes => "clothes",
            MeasurementKind::Shoes => "shoes",
            MeasurementKind::Accessories => "accessories",
        }
    }
}

impl AsField for MeasurementKind {
    fn as_field(&self) -> FieldValue<'_> {
        FieldValue::Text(self.as_str())
    }
}

/// A body or fit measurement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Record)]
#[serde(default)]
#[record(collection = "measurements")]
pub struct Measurement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MeasurementKind,
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub notes: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl AsField for Priority {
    fn as_field(&self) -> FieldValue<'_> {
        FieldValue::Text(self.as_str())
    }
}

/// A planned shopping trip.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Record)]
#[serde(rename_all = "camelCase", default)]
#[record(collection = "shoppingSchedules")]
pub struct ShoppingSchedule {
    pub id: String,
    pub item_name: String,
    pub store: String,
    #[record(skip)]
    pub date: NaiveDate,
    pub budget: f64,
    pub priority: Priority,
    pub notes: String,
    #[record(flag)]
    pub is_online: bool,
}

/// The signed-in user. Stored alone under the `user` key, not as a collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub email: String,
    pub provider: String,
}

impl User {
    pub const KEY: &'static str = "user";

    pub fn new(name: impl Into<String>, email: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            provider: provider.into(),
        }
    }
}
