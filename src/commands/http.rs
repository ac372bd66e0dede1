//! HTTP Remote Store
//!
//! `reqwest` client for the packing list backend.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{item, list, RemoteError, RemoteResult, RemoteStore};
use crate::config::Config;
use crate::models::{Category, Item, ItemPatch, NewItem, NewList, Stats, TravelList};

/// Characters left as-is inside a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    api_base: String,
}

impl HttpRemoteStore {
    /// Build a store for `config.api_base()`.
    ///
    /// No request timeout is set; a call that never answers stays pending.
    pub fn new(config: &Config) -> RemoteResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_base: config.api_base(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// `{api_base}/{seg}/{seg}...` with each segment percent-encoded
    pub(super) fn url(&self, segments: &[&str]) -> String {
        let mut url = self.api_base.clone();
        for segment in segments {
            url.push('/');
            url.extend(utf8_percent_encode(segment, SEGMENT));
        }
        url
    }

    pub(super) fn get(&self, segments: &[&str]) -> RequestBuilder {
        self.client.get(self.url(segments))
    }

    pub(super) fn post(&self, segments: &[&str]) -> RequestBuilder {
        self.client.post(self.url(segments))
    }

    pub(super) fn put(&self, segments: &[&str]) -> RequestBuilder {
        self.client.put(self.url(segments))
    }

    pub(super) fn delete(&self, segments: &[&str]) -> RequestBuilder {
        self.client.delete(self.url(segments))
    }
}

/// Send a request and decode a JSON body
pub(super) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> RemoteResult<T> {
    let body = send(request).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Send a request; any non-2xx status is an error
pub(super) async fn send(request: RequestBuilder) -> RemoteResult<String> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_categories(&self) -> RemoteResult<Vec<Category>> {
        list::list_categories(self).await
    }

    async fn list_travel_lists(&self) -> RemoteResult<Vec<TravelList>> {
        list::list_travel_lists(self).await
    }

    async fn create_travel_list(&self, new_list: &NewList) -> RemoteResult<TravelList> {
        list::create_travel_list(self, new_list).await
    }

    async fn get_travel_list(&self, list_id: &str) -> RemoteResult<TravelList> {
        list::get_travel_list(self, list_id).await
    }

    async fn get_stats(&self, list_id: &str) -> RemoteResult<Stats> {
        list::get_stats(self, list_id).await
    }

    async fn update_item(&self, list_id: &str, item_id: &str, patch: &ItemPatch) -> RemoteResult<Item> {
        item::update_item(self, list_id, item_id, patch).await
    }

    async fn create_item(&self, list_id: &str, new_item: &NewItem) -> RemoteResult<Item> {
        item::create_item(self, list_id, new_item).await
    }

    async fn delete_item(&self, list_id: &str, item_id: &str) -> RemoteResult<()> {
        item::delete_item(self, list_id, item_id).await
    }
}
