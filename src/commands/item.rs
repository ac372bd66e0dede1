//! Item Commands
//!
//! Bindings for item endpoints of a travel list.

use super::http::{send, send_json, HttpRemoteStore};
use super::RemoteResult;
use crate::models::{Item, ItemPatch, NewItem};

/// Partial update; only fields set in `patch` are sent
pub async fn update_item(
    store: &HttpRemoteStore,
    list_id: &str,
    item_id: &str,
    patch: &ItemPatch,
) -> RemoteResult<Item> {
    send_json(store.put(&["travel-lists", list_id, "items", item_id]).json(patch)).await
}

pub async fn create_item(store: &HttpRemoteStore, list_id: &str, new_item: &NewItem) -> RemoteResult<Item> {
    send_json(store.post(&["travel-lists", list_id, "items"]).json(new_item)).await
}

pub async fn delete_item(store: &HttpRemoteStore, list_id: &str, item_id: &str) -> RemoteResult<()> {
    // Confirmation body is not needed
    send(store.delete(&["travel-lists", list_id, "items", item_id])).await?;
    Ok(())
}
