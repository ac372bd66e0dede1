//! State Controller
//!
//! Sole writer of the list, item and stats state. Every mutation goes to
//! the remote store first; local state changes only after the store
//! confirms. Mutations that change counts are followed by a stats refresh,
//! sequenced so a slow, older refresh never overwrites a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::commands::{RemoteError, RemoteStore};
use crate::error::{Error, Result};
use crate::forms::{validate_item_form, validate_list_form};
use crate::grouping::CategoryGroup;
use crate::models::{Category, Item, ItemPatch, ListId, Stats, TravelList};
use crate::store::{
    store_add_list, store_append_item, store_clear_pending, store_mark_pending, store_remove_item,
    store_update_item, AppState, Snapshot,
};


pub struct StateController<S> {
    remote: S,
    state: RwLock<AppState>,
    /// Last sequence number handed to a stats refresh
    refresh_seq: AtomicU64,
}

/// Marks an operation in flight until dropped
struct Pending<'a> {
    state: &'a RwLock<AppState>,
    item_id: Option<String>,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        store_clear_pending(&mut state, self.item_id.as_deref());
    }
}

impl<S: RemoteStore> StateController<S> {
    pub fn new(remote: S) -> Self {
        Self {
            remote,
            state: RwLock::new(AppState::default()),
            refresh_seq: AtomicU64::new(0),
        }
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    // ========================
    // Read accessors
    // ========================

    pub fn snapshot(&self) -> Snapshot {
        self.read(AppState::snapshot)
    }

    pub fn lists(&self) -> Vec<Arc<TravelList>> {
        self.read(|state| state.lists.clone())
    }

    pub fn active_list(&self) -> Option<Arc<TravelList>> {
        self.read(|state| state.active_list().cloned())
    }

    pub fn categories(&self) -> Arc<Vec<Category>> {
        self.read(|state| Arc::clone(&state.categories))
    }

    pub fn stats(&self) -> Option<Stats> {
        self.read(|state| state.stats.stats().cloned())
    }

    /// Items of the active list grouped by category, handed to `f`
    pub fn grouped<R>(&self, f: impl FnOnce(&[CategoryGroup<'_>]) -> R) -> R {
        let snapshot = self.snapshot();
        f(&snapshot.groups())
    }

    /// A mutation for this item has been sent and not yet answered.
    ///
    /// While true, `toggle_item_packed` for the item fails with
    /// [`Error::ItemPending`] rather than resend the same unconfirmed value.
    pub fn is_pending(&self, item_id: &str) -> bool {
        self.read(|state| state.pending_items.contains_key(item_id))
    }

    pub fn in_flight(&self) -> usize {
        self.read(|state| state.in_flight)
    }

    pub fn last_error(&self) -> Option<String> {
        self.read(|state| state.last_error.clone())
    }

    // ========================
    // Operations
    // ========================

    /// Load the catalog and all lists; the first list becomes active.
    ///
    /// On failure nothing is kept.
    pub async fn bootstrap(&self) -> Result<()> {
        let loaded = tokio::try_join!(self.remote.list_categories(), self.remote.list_travel_lists());
        let (categories, lists) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => return Err(self.remote_failed("loading lists", e)),
        };

        info!(categories = categories.len(), lists = lists.len(), "loaded travel lists");
        let first = lists.first().map(|list| list.id.clone());
        self.write(|state| {
            state.last_error = None;
            state.categories = Arc::new(categories);
            state.lists = lists.into_iter().map(Arc::new).collect();
            if let Some(id) = &first {
                state.set_active(id);
            }
        });

        if let Some(id) = first {
            let _ = self.refresh_stats_for(&id).await;
        }
        Ok(())
    }

    /// Create a list and make it active.
    pub async fn create_list(&self, name: &str, destination: &str) -> Result<Arc<TravelList>> {
        let new_list = validate_list_form(name, destination)?;

        let created = {
            let _pending = self.track(None);
            self.remote.create_travel_list(&new_list).await
        };
        let list = created.map_err(|e| self.remote_failed("creating list", e))?;

        let list_id = list.id.clone();
        info!(list_id = %list_id, items = list.items.len(), "created travel list");
        let handle = self.write(|state| {
            state.last_error = None;
            let handle = store_add_list(state, list);
            state.set_active(&list_id);
            handle
        });

        let _ = self.refresh_stats_for(&list_id).await;
        Ok(handle)
    }

    /// Make another known list active; unknown ids are ignored.
    pub async fn select_list(&self, list_id: &str) -> Result<()> {
        let known = self.write(|state| {
            let known = state.list(list_id).is_some();
            if known {
                state.set_active(list_id);
            }
            known
        });
        if !known {
            debug!(list_id, "select ignored, unknown list");
            return Ok(());
        }
        let _ = self.refresh_stats_for(list_id).await;
        Ok(())
    }

    /// Flip an item's packed flag.
    ///
    /// An item not in the active list is ignored without a remote call.
    /// An item with a change still in flight is rejected.
    pub async fn toggle_item_packed(&self, item_id: &str) -> Result<()> {
        let found = self.read(|state| {
            let pending = state.pending_items.contains_key(item_id);
            state.active_list().and_then(|list| {
                list.item(item_id)
                    .map(|item| (list.id.clone(), item.is_packed, pending))
            })
        });
        let Some((list_id, is_packed, pending)) = found else {
            debug!(item_id, "toggle ignored, item not in active list");
            return Ok(());
        };
        if pending {
            debug!(item_id, "toggle rejected, change in flight");
            return Err(Error::ItemPending(item_id.to_string()));
        }

        let is_packed = !is_packed;
        let updated = {
            let _pending = self.track(Some(item_id));
            self.remote.update_item(&list_id, item_id, &ItemPatch::packed(is_packed)).await
        };
        updated.map_err(|e| self.remote_failed("updating item", e))?;

        debug!(list_id = %list_id, item_id, is_packed, "item packed flag updated");
        self.write(|state| {
            state.last_error = None;
            store_update_item(state, &list_id, item_id, |item| Item {
                is_packed,
                ..item.clone()
            });
        });

        let _ = self.refresh_stats_for(&list_id).await;
        Ok(())
    }

    /// Replace an item's notes. Counts don't change, so stats are not refreshed.
    pub async fn update_item_notes(&self, item_id: &str, notes: &str) -> Result<()> {
        let Some(list_id) = self.active_list_with_item(item_id) else {
            debug!(item_id, "notes ignored, item not in active list");
            return Ok(());
        };

        let updated = {
            let _pending = self.track(Some(item_id));
            self.remote.update_item(&list_id, item_id, &ItemPatch::notes(notes)).await
        };
        updated.map_err(|e| self.remote_failed("updating notes", e))?;

        let notes = (!notes.is_empty()).then(|| notes.to_string());
        self.write(|state| {
            state.last_error = None;
            store_update_item(state, &list_id, item_id, |item| Item {
                notes: notes.clone(),
                ..item.clone()
            });
        });
        Ok(())
    }

    /// Add an item to the active list. A blank category means miscellaneous.
    pub async fn add_item(&self, name: &str, name_ar: &str, category: &str, notes: &str) -> Result<Item> {
        let new_item = validate_item_form(name, name_ar, category, notes)?;
        let list_id = self.active_list_id().ok_or(Error::NoActiveList)?;

        let created = {
            let _pending = self.track(None);
            self.remote.create_item(&list_id, &new_item).await
        };
        let item = created.map_err(|e| self.remote_failed("adding item", e))?;

        info!(list_id = %list_id, item_id = %item.id, category = %item.category, "item added");
        self.write(|state| {
            state.last_error = None;
            store_append_item(state, &list_id, item.clone());
        });

        let _ = self.refresh_stats_for(&list_id).await;
        Ok(item)
    }

    /// Delete an item from the active list.
    ///
    /// The remote call is made even if the item is not held locally;
    /// local removal is idempotent.
    pub async fn delete_item(&self, item_id: &str) -> Result<()> {
        let Some(list_id) = self.active_list_id() else {
            debug!(item_id, "delete ignored, no active list");
            return Ok(());
        };

        let deleted = {
            let _pending = self.track(Some(item_id));
            self.remote.delete_item(&list_id, item_id).await
        };
        deleted.map_err(|e| self.remote_failed("deleting item", e))?;

        let removed = self.write(|state| {
            state.last_error = None;
            store_remove_item(state, &list_id, item_id)
        });
        info!(list_id = %list_id, item_id, removed, "item deleted");

        let _ = self.refresh_stats_for(&list_id).await;
        Ok(())
    }

    /// Re-fetch the active list and replace the local copy with it.
    ///
    /// The fetched copy is dropped if an item change to the list was
    /// confirmed while it was in flight, since it may predate that change.
    pub async fn reload_active_list(&self) -> Result<()> {
        let (list_id, revision) = self
            .read(|state| {
                state
                    .active_list()
                    .map(|list| (list.id.clone(), state.revision(&list.id)))
            })
            .ok_or(Error::NoActiveList)?;

        let fetched = {
            let _pending = self.track(None);
            self.remote.get_travel_list(&list_id).await
        };
        let list = fetched.map_err(|e| self.remote_failed("reloading list", e))?;

        let replaced = self.write(|state| {
            state.last_error = None;
            if state.revision(&list_id) != revision {
                return false;
            }
            store_add_list(state, list);
            true
        });
        if replaced {
            debug!(list_id = %list_id, revision, "list reloaded");
        } else {
            debug!(list_id = %list_id, revision, "stale reload discarded");
        }

        let _ = self.refresh_stats_for(&list_id).await;
        Ok(())
    }

    /// Refresh stats of the active list.
    pub async fn refresh_stats(&self) -> Result<()> {
        let list_id = self.active_list_id().ok_or(Error::NoActiveList)?;
        self.refresh_stats_for(&list_id).await?;
        Ok(())
    }

    /// Fetch stats for `list_id` and apply them if still the newest.
    ///
    /// Returns whether the result was applied.
    async fn refresh_stats_for(&self, list_id: &str) -> Result<bool> {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let stats = self
            .remote
            .get_stats(list_id)
            .await
            .map_err(|e| self.remote_failed("refreshing stats", e))?;

        let applied = self.write(|state| {
            let applied = state.stats.apply(seq, list_id, stats);
            if applied {
                state.last_error = None;
            }
            applied
        });
        if applied {
            debug!(list_id, seq, "stats applied");
        } else {
            debug!(list_id, seq, "stale stats discarded");
        }
        Ok(applied)
    }

    // ========================
    // Helpers
    // ========================

    fn active_list_id(&self) -> Option<ListId> {
        self.read(|state| state.active_list().map(|list| list.id.clone()))
    }

    fn active_list_with_item(&self, item_id: &str) -> Option<ListId> {
        self.read(|state| {
            state
                .active_list()
                .filter(|list| list.item(item_id).is_some())
                .map(|list| list.id.clone())
        })
    }

    fn track(&self, item_id: Option<&str>) -> Pending<'_> {
        self.write(|state| store_mark_pending(state, item_id));
        Pending {
            state: &self.state,
            item_id: item_id.map(str::to_string),
        }
    }

    /// Log a failed call and keep it as the last error
    fn remote_failed(&self, action: &str, err: RemoteError) -> Error {
        warn!(error = %err, "error {}", action);
        let message = format!("error {}: {}", action, err);
        self.write(|state| state.last_error = Some(message));
        Error::Remote(err)
    }

    fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    fn write<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }
}
