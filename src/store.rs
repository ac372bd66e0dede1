//! Application State Store
//!
//! State owned by the controller. Lists are held as `Arc<TravelList>` and
//! replaced wholesale on every confirmed change, so a handle given to the
//! view never changes under it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::grouping::{group_items, CategoryGroup};
use crate::models::{Category, Item, ItemId, ListId, Stats, TravelList};
use crate::stats::StatsView;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Every known list, in server order plus lists created since
    pub lists: Vec<Arc<TravelList>>,
    pub active_list_id: Option<ListId>,
    pub categories: Arc<Vec<Category>>,
    pub stats: StatsView,
    /// Item id -> number of mutations in flight for it
    pub pending_items: HashMap<ItemId, usize>,
    pub in_flight: usize,
    /// List id -> number of confirmed item changes applied to it
    pub list_revisions: HashMap<ListId, u64>,
    /// Most recent remote failure, cleared by the next success
    pub last_error: Option<String>,
}

impl AppState {
    pub fn list(&self, list_id: &str) -> Option<&Arc<TravelList>> {
        self.lists.iter().find(|list| list.id == list_id)
    }

    pub fn active_list(&self) -> Option<&Arc<TravelList>> {
        self.active_list_id.as_deref().and_then(|id| self.list(id))
    }

    pub fn revision(&self, list_id: &str) -> u64 {
        self.list_revisions.get(list_id).copied().unwrap_or(0)
    }

    pub fn is_active(&self, list_id: &str) -> bool {
        self.active_list_id.as_deref() == Some(list_id)
    }

    /// Make `list_id` active; stats of the previous list are dropped.
    pub fn set_active(&mut self, list_id: &str) {
        if self.is_active(list_id) {
            return;
        }
        self.active_list_id = Some(list_id.to_string());
        self.stats = StatsView::for_list(list_id);
    }

    /// Read handle for the view layer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            list: self.active_list().cloned(),
            categories: Arc::clone(&self.categories),
            stats: self.stats.stats().cloned(),
            fallback: Category::miscellaneous(),
        }
    }
}

/// Immutable view of the active list, catalog and stats at one instant
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub list: Option<Arc<TravelList>>,
    pub categories: Arc<Vec<Category>>,
    pub stats: Option<Stats>,
    fallback: Category,
}

impl Snapshot {
    pub fn items(&self) -> &[Item] {
        self.list.as_deref().map(|list| list.items.as_slice()).unwrap_or_default()
    }

    /// Items grouped by category; recomputed on every call
    pub fn groups(&self) -> Vec<CategoryGroup<'_>> {
        group_items(self.items(), &self.categories, &self.fallback)
    }
}

// ========================
// Store Helper Functions
// ========================

/// Add a list, replacing a known one with the same id
pub fn store_add_list(state: &mut AppState, list: TravelList) -> Arc<TravelList> {
    let list = Arc::new(list);
    match state.lists.iter_mut().find(|known| known.id == list.id) {
        Some(known) => *known = Arc::clone(&list),
        None => state.lists.push(Arc::clone(&list)),
    }
    list
}

/// Replace a list's items with `f(old_items)` and bump its revision.
/// Returns false for an unknown list.
pub fn store_replace_items<F>(state: &mut AppState, list_id: &str, f: F) -> bool
where
    F: FnOnce(&[Item]) -> Vec<Item>,
{
    let Some(list) = state.lists.iter_mut().find(|list| list.id == list_id) else {
        return false;
    };
    let items = f(&list.items);
    *list = Arc::new(list.with_items(items));
    *state.list_revisions.entry(list_id.to_string()).or_insert(0) += 1;
    true
}

/// Replace one item by id with `f(old_item)`
pub fn store_update_item<F>(state: &mut AppState, list_id: &str, item_id: &str, f: F) -> bool
where
    F: Fn(&Item) -> Item,
{
    store_replace_items(state, list_id, |items| {
        items
            .iter()
            .map(|item| if item.id == item_id { f(item) } else { item.clone() })
            .collect()
    })
}

/// Append an item to a list. An item already held under the same id is
/// replaced in place instead.
pub fn store_append_item(state: &mut AppState, list_id: &str, item: Item) -> bool {
    store_replace_items(state, list_id, |items| {
        let mut next = items.to_vec();
        match next.iter_mut().find(|known| known.id == item.id) {
            Some(known) => *known = item,
            None => next.push(item),
        }
        next
    })
}

/// Remove an item by id; absent ids leave the list untouched
pub fn store_remove_item(state: &mut AppState, list_id: &str, item_id: &str) -> bool {
    let present = state
        .list(list_id)
        .is_some_and(|list| list.item(item_id).is_some());
    if !present {
        return false;
    }
    store_replace_items(state, list_id, |items| {
        items.iter().filter(|item| item.id != item_id).cloned().collect()
    })
}

pub fn store_mark_pending(state: &mut AppState, item_id: Option<&str>) {
    state.in_flight += 1;
    if let Some(id) = item_id {
        *state.pending_items.entry(id.to_string()).or_insert(0) += 1;
    }
}

pub fn store_clear_pending(state: &mut AppState, item_id: Option<&str>) {
    state.in_flight = state.in_flight.saturating_sub(1);
    if let Some(id) = item_id {
        if let Some(count) = state.pending_items.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                state.pending_items.remove(id);
            }
        }
    }
}
