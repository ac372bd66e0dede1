//! Remote Store Commands
//!
//! The remote store contract and its HTTP bindings, organized by domain.

mod http;
mod item;
mod list;

use async_trait::async_trait;

use crate::models::{Category, Item, ItemPatch, NewItem, NewList, Stats, TravelList};

pub use http::HttpRemoteStore;

/// Failure of a single remote call
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Authoritative store for lists, items, categories and stats.
///
/// Every call is one round trip; nothing is cached on this side.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_categories(&self) -> RemoteResult<Vec<Category>>;

    async fn list_travel_lists(&self) -> RemoteResult<Vec<TravelList>>;

    async fn create_travel_list(&self, list: &NewList) -> RemoteResult<TravelList>;

    async fn get_travel_list(&self, list_id: &str) -> RemoteResult<TravelList>;

    /// Aggregate counts, computed server-side
    async fn get_stats(&self, list_id: &str) -> RemoteResult<Stats>;

    async fn update_item(&self, list_id: &str, item_id: &str, patch: &ItemPatch) -> RemoteResult<Item>;

    /// Returns the item with its server-assigned id
    async fn create_item(&self, list_id: &str, item: &NewItem) -> RemoteResult<Item>;

    async fn delete_item(&self, list_id: &str, item_id: &str) -> RemoteResult<()>;
}
