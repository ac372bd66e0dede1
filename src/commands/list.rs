//! List Commands
//!
//! Bindings for category, list and stats endpoints.

use super::http::{send_json, HttpRemoteStore};
use super::RemoteResult;
use crate::models::{Category, NewList, Stats, TravelList};

pub async fn list_categories(store: &HttpRemoteStore) -> RemoteResult<Vec<Category>> {
    send_json(store.get(&["categories"])).await
}

pub async fn list_travel_lists(store: &HttpRemoteStore) -> RemoteResult<Vec<TravelList>> {
    send_json(store.get(&["travel-lists"])).await
}

pub async fn create_travel_list(store: &HttpRemoteStore, new_list: &NewList) -> RemoteResult<TravelList> {
    send_json(store.post(&["travel-lists"]).json(new_list)).await
}

pub async fn get_travel_list(store: &HttpRemoteStore, list_id: &str) -> RemoteResult<TravelList> {
    send_json(store.get(&["travel-lists", list_id])).await
}

/// Progress counts for one list
pub async fn get_stats(store: &HttpRemoteStore, list_id: &str) -> RemoteResult<Stats> {
    send_json(store.get(&["travel-lists", list_id, "stats"])).await
}
