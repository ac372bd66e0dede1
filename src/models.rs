//! Frontend Models
//!
//! Data structures matching the remote store's JSON.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

pub type ListId = String;
pub type ItemId = String;
pub type CategoryId = String;

/// Category id used when an item has none, or one the catalog doesn't know
pub const MISCELLANEOUS: &str = "miscellaneous";

/// Packing list item (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub name_ar: String,
    #[serde(default = "default_category")]
    pub category: CategoryId,
    #[serde(default)]
    pub is_packed: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Travel list with its items (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelList {
    pub id: ListId,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub destination: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl TravelList {
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Copy of this list with `items` swapped in
    pub fn with_items(&self, items: Vec<Item>) -> Self {
        Self {
            items,
            ..self.clone()
        }
    }
}

/// Catalog entry; reference data, never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    pub name_ar: String,
    pub icon: String,
    pub color: String,
}

impl Category {
    /// Built-in bucket for items the catalog cannot place
    pub fn miscellaneous() -> Self {
        Self {
            id: MISCELLANEOUS.to_string(),
            name: "Miscellaneous".to_string(),
            name_ar: "متنوعات".to_string(),
            icon: "🎒".to_string(),
            color: "bg-yellow-100 text-yellow-800".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub total: u32,
    pub packed: u32,
}

/// Aggregate progress of one list, as computed by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_items: u32,
    pub packed_items: u32,
    pub remaining_items: u32,
    pub progress_percentage: f64,
    #[serde(default)]
    pub category_stats: BTreeMap<CategoryId, CategoryStat>,
}

impl Stats {
    /// Percentage the counts imply, rounded to a whole number
    pub fn expected_percentage(packed: u32, total: u32) -> f64 {
        if total == 0 {
            0.0
        } else {
            (100.0 * f64::from(packed) / f64::from(total)).round()
        }
    }

    /// Counts add up and the percentage matches them.
    ///
    /// The backend rounds to one decimal, so anything within half a point
    /// of the exact ratio is accepted.
    pub fn is_consistent(&self) -> bool {
        if self.packed_items + self.remaining_items != self.total_items {
            return false;
        }
        if self.total_items == 0 {
            return self.progress_percentage == 0.0;
        }
        let exact = 100.0 * f64::from(self.packed_items) / f64::from(self.total_items);
        (self.progress_percentage - exact).abs() <= 0.5
    }
}

/// Body of the create-list call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewList {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Body of the create-item call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItem {
    pub name: String,
    pub name_ar: String,
    pub category: CategoryId,
    pub notes: String,
}

/// Partial item update; unset fields are left alone by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_packed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ItemPatch {
    pub fn packed(is_packed: bool) -> Self {
        Self {
            is_packed: Some(is_packed),
            ..Default::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Default::default()
        }
    }
}

fn default_category() -> CategoryId {
    MISCELLANEOUS.to_string()
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
