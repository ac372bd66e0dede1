//! In-memory remote store for controller tests.
//!
//! Computes stats the way the backend does, records every call, and can
//! fail or hold (on a oneshot gate) the next call of a given kind.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::commands::{RemoteError, RemoteResult, RemoteStore};
use crate::models::{Category, CategoryStat, Item, ItemPatch, NewItem, NewList, Stats, TravelList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    ListCategories,
    ListTravelLists,
    CreateTravelList,
    GetTravelList,
    GetStats,
    UpdateItem,
    CreateItem,
    DeleteItem,
}

#[derive(Default)]
struct FakeState {
    categories: Vec<Category>,
    lists: Vec<TravelList>,
    calls: Vec<Call>,
    failures: HashMap<Call, usize>,
    gates: HashMap<Call, VecDeque<oneshot::Receiver<()>>>,
    next_id: u32,
}

impl FakeState {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-new-{}", prefix, self.next_id)
    }

    fn list_mut(&mut self, list_id: &str) -> RemoteResult<&mut TravelList> {
        self.lists
            .iter_mut()
            .find(|list| list.id == list_id)
            .ok_or_else(|| not_found("Travel list not found"))
    }
}

pub struct FakeStore {
    state: Mutex<FakeState>,
}

pub fn category(id: &str) -> Category {
    Category {
        id: id.to_string(),
        name: id.to_string(),
        name_ar: id.to_string(),
        icon: String::new(),
        color: String::new(),
    }
}

pub fn item(id: &str, category: &str, is_packed: bool) -> Item {
    Item {
        id: id.to_string(),
        name: format!("Item {}", id),
        name_ar: format!("عنصر {}", id),
        category: category.to_string(),
        is_packed,
        notes: None,
        created_at: None,
        updated_at: None,
    }
}

fn not_found(detail: &str) -> RemoteError {
    RemoteError::Status {
        status: 404,
        body: format!(r#"{{"detail":"{}"}}"#, detail),
    }
}

impl FakeStore {
    /// Store with the backend's default catalog and no lists
    pub fn new() -> Self {
        let categories = ["clothes", "toiletries", "electronics", "documents", "medicine", "miscellaneous"]
            .into_iter()
            .map(category)
            .collect();
        Self {
            state: Mutex::new(FakeState {
                categories,
                ..Default::default()
            }),
        }
    }

    /// Add a list; items are `(id, category, is_packed)`
    pub fn with_list(self, id: &str, name: &str, items: &[(&str, &str, bool)]) -> Self {
        self.lock().lists.push(TravelList {
            id: id.to_string(),
            name: name.to_string(),
            destination: None,
            items: items.iter().map(|(id, cat, packed)| item(id, cat, *packed)).collect(),
            created_at: None,
            updated_at: None,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn list(&self, list_id: &str) -> Option<TravelList> {
        self.lock().lists.iter().find(|list| list.id == list_id).cloned()
    }

    /// Make the next `call` fail with a 500
    pub fn fail_next(&self, call: Call) {
        *self.lock().failures.entry(call).or_insert(0) += 1;
    }

    /// Park the next `call` until the returned sender fires (or is dropped)
    pub fn hold_next(&self, call: Call) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().gates.entry(call).or_default().push_back(rx);
        tx
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Record the call, apply injected failure, hand back its gate
    fn begin(&self, call: Call) -> RemoteResult<Option<oneshot::Receiver<()>>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(remaining) = state.failures.get_mut(&call) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RemoteError::Status {
                    status: 500,
                    body: "injected failure".to_string(),
                });
            }
        }
        Ok(state.gates.get_mut(&call).and_then(VecDeque::pop_front))
    }

    fn compute_stats(&self, list_id: &str) -> RemoteResult<Stats> {
        let mut state = self.lock();
        let list = state.list_mut(list_id)?;

        let total_items = list.items.len() as u32;
        let packed_items = list.items.iter().filter(|item| item.is_packed).count() as u32;
        let progress_percentage = if total_items == 0 {
            0.0
        } else {
            (1000.0 * f64::from(packed_items) / f64::from(total_items)).round() / 10.0
        };

        let mut category_stats = std::collections::BTreeMap::new();
        for item in &list.items {
            let entry: &mut CategoryStat = category_stats.entry(item.category.clone()).or_default();
            entry.total += 1;
            if item.is_packed {
                entry.packed += 1;
            }
        }

        Ok(Stats {
            total_items,
            packed_items,
            remaining_items: total_items - packed_items,
            progress_percentage,
            category_stats,
        })
    }
}

async fn wait(gate: Option<oneshot::Receiver<()>>) {
    if let Some(rx) = gate {
        let _ = rx.await;
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn list_categories(&self) -> RemoteResult<Vec<Category>> {
        wait(self.begin(Call::ListCategories)?).await;
        Ok(self.lock().categories.clone())
    }

    async fn list_travel_lists(&self) -> RemoteResult<Vec<TravelList>> {
        wait(self.begin(Call::ListTravelLists)?).await;
        Ok(self.lock().lists.clone())
    }

    async fn create_travel_list(&self, new_list: &NewList) -> RemoteResult<TravelList> {
        wait(self.begin(Call::CreateTravelList)?).await;
        let mut state = self.lock();
        let id = state.fresh_id("list");
        // New lists come pre-seeded, like the backend's defaults
        let items = vec![
            item(&state.fresh_id("item"), "documents", false),
            item(&state.fresh_id("item"), "toiletries", false),
        ];
        let list = TravelList {
            id,
            name: new_list.name.clone(),
            destination: new_list.destination.clone(),
            items,
            created_at: None,
            updated_at: None,
        };
        state.lists.push(list.clone());
        Ok(list)
    }

    async fn get_travel_list(&self, list_id: &str) -> RemoteResult<TravelList> {
        let gate = self.begin(Call::GetTravelList)?;
        // Read before parking, like get_stats
        let list = self.lock().list_mut(list_id)?.clone();
        wait(gate).await;
        Ok(list)
    }

    async fn get_stats(&self, list_id: &str) -> RemoteResult<Stats> {
        let gate = self.begin(Call::GetStats)?;
        // Computed before parking, so a held response is stale on arrival
        let stats = self.compute_stats(list_id)?;
        wait(gate).await;
        Ok(stats)
    }

    async fn update_item(&self, list_id: &str, item_id: &str, patch: &ItemPatch) -> RemoteResult<Item> {
        wait(self.begin(Call::UpdateItem)?).await;
        let mut state = self.lock();
        let list = state.list_mut(list_id)?;
        let item = list
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| not_found("Travel list or item not found"))?;
        if let Some(is_packed) = patch.is_packed {
            item.is_packed = is_packed;
        }
        if let Some(notes) = &patch.notes {
            item.notes = (!notes.is_empty()).then(|| notes.clone());
        }
        Ok(item.clone())
    }

    async fn create_item(&self, list_id: &str, new_item: &NewItem) -> RemoteResult<Item> {
        wait(self.begin(Call::CreateItem)?).await;
        let mut state = self.lock();
        let id = state.fresh_id("item");
        let created = Item {
            id,
            name: new_item.name.clone(),
            name_ar: new_item.name_ar.clone(),
            category: new_item.category.clone(),
            is_packed: false,
            notes: (!new_item.notes.is_empty()).then(|| new_item.notes.clone()),
            created_at: None,
            updated_at: None,
        };
        state.list_mut(list_id)?.items.push(created.clone());
        Ok(created)
    }

    async fn delete_item(&self, list_id: &str, item_id: &str) -> RemoteResult<()> {
        wait(self.begin(Call::DeleteItem)?).await;
        let mut state = self.lock();
        // Removing an absent item still succeeds
        state.list_mut(list_id)?.items.retain(|item| item.id != item_id);
        Ok(())
    }
}
