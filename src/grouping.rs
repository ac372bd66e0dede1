//! Grouping Utilities
//!
//! Partition a list's items by category for display.

use std::collections::{HashMap, HashSet};

use crate::models::{Category, Item, MISCELLANEOUS};

/// One category and its items, in list order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a Category,
    pub items: Vec<&'a Item>,
}

impl CategoryGroup<'_> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn packed_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_packed).count()
    }
}

/// Group items by category, in catalog order.
///
/// Empty categories are left out. Items whose category the catalog doesn't
/// know land in the miscellaneous bucket; if the catalog has no such entry,
/// `fallback` is appended last to hold them.
pub fn group_items<'a>(
    items: &'a [Item],
    categories: &'a [Category],
    fallback: &'a Category,
) -> Vec<CategoryGroup<'a>> {
    let known: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();

    let mut buckets: HashMap<&str, Vec<&Item>> = HashMap::new();
    for item in items {
        let key = if known.contains(item.category.as_str()) {
            item.category.as_str()
        } else {
            MISCELLANEOUS
        };
        buckets.entry(key).or_default().push(item);
    }

    let mut groups: Vec<CategoryGroup<'a>> = categories
        .iter()
        .filter_map(|category| {
            buckets.remove(category.id.as_str()).map(|items| CategoryGroup { category, items })
        })
        .collect();

    if let Some(items) = buckets.remove(MISCELLANEOUS) {
        groups.push(CategoryGroup {
            category: fallback,
            items,
        });
    }

    groups
}
