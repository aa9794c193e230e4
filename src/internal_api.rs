use crate::api_model::timestamp_value;
use crate::api_model::DeleteResponse;
use crate::api_model::Fields;
use crate::api_model::Item;
use crate::api_model::ItemCreate;
use crate::cache_api::CacheUpdatePolicy;
use crate::cache_api::ItemCache;
use crate::database_api;
use crate::database_api::DocumentStore;
use crate::error::Error;
use crate::error::Result;
use chrono::Utc;
use log::debug;
use log::warn;
use std::sync::Arc;

/// Get project version as seen by Cargo.
pub fn get_project_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// The five item operations over one document store collection,
/// with the cache mirrored after every successful store call.
///
/// The store is the source of truth: cache failures are logged
/// and never fail a request whose store call succeeded.
pub struct ItemsApi {
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn ItemCache>,
    cache_update_policy: CacheUpdatePolicy,
}

impl ItemsApi {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn ItemCache>,
        cache_update_policy: CacheUpdatePolicy,
    ) -> ItemsApi {
        ItemsApi {
            store,
            cache,
            cache_update_policy,
        }
    }

    pub async fn create_item(&self, payload: ItemCreate) -> Result<Item> {
        payload.validate()?;
        let item = Item {
            id: database_api::generate_document_id(),
            fields: payload.fields,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        debug!("Creating item {}", item.id);
        let document = item.to_document();
        self.store.insert(&item.id, &document).await?;
        self.cache_document(&item.id, &document).await;
        Ok(item)
    }

    /// A cached entry is returned as is, without consulting the store.
    pub async fn get_item(&self, id: &str) -> Result<Item> {
        debug!("Getting item {}", id);
        if let Some(document) = self.cached_document(id).await {
            return Item::from_document(id.to_string(), document);
        }
        let document = self.store.get(id).await?.ok_or_else(Error::not_found)?;
        self.cache_document(id, &document).await;
        Item::from_document(id.to_string(), document)
    }

    pub async fn list_items(&self) -> Result<Vec<Item>> {
        debug!("Listing items");
        let documents = self.store.list().await?;
        documents
            .into_iter()
            .map(|document| Item::from_document(document.id, document.data))
            .collect()
    }

    /// Overwrite the fields of an existing item and stamp `updated_at`.
    /// Stored fields that are not part of the payload, `created_at` included, are kept.
    pub async fn update_item(&self, id: &str, payload: ItemCreate) -> Result<Item> {
        payload.validate()?;
        debug!("Updating item {}", id);
        let mut patch = payload.fields;
        patch.insert("updated_at".to_string(), timestamp_value(&Utc::now()));
        if !self.store.update(id, &patch).await? {
            // A concurrent read may have cached the item after it was deleted.
            self.uncache(id).await;
            return Err(Error::not_found());
        }
        match self.cache_update_policy {
            CacheUpdatePolicy::Payload => self.cache_document(id, &patch).await,
            CacheUpdatePolicy::Merged => self.cache_stored_document(id).await,
            CacheUpdatePolicy::Invalidate => self.uncache(id).await,
        }
        Item::from_document(id.to_string(), patch)
    }

    pub async fn delete_item(&self, id: &str) -> Result<DeleteResponse> {
        debug!("Deleting item {}", id);
        if !self.store.delete(id).await? {
            self.uncache(id).await;
            return Err(Error::not_found());
        }
        self.uncache(id).await;
        Ok(DeleteResponse::default())
    }

    //
    // cache helpers:
    //

    async fn cached_document(&self, id: &str) -> Option<Fields> {
        if !self.cache.is_enabled() {
            return None;
        }
        let cached = match self.cache.get(id).await {
            Ok(cached) => cached?,
            Err(err) => {
                warn!("Failed to read item {} from cache, {}", id, err);
                return None;
            }
        };
        match serde_json::from_str(&cached) {
            Ok(document) => Some(document),
            Err(err) => {
                warn!("Ignoring unreadable cache entry for item {}, {}", id, err);
                None
            }
        }
    }

    async fn cache_document(&self, id: &str, document: &Fields) {
        if !self.cache.is_enabled() {
            return;
        }
        let result = match serde_json::to_string(document) {
            Ok(json) => self.cache.set(id, &json).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = result {
            warn!("Failed to cache item {}, {}", id, err);
            // An older entry must not outlive a failed overwrite.
            self.uncache(id).await;
        }
    }

    async fn cache_stored_document(&self, id: &str) {
        if !self.cache.is_enabled() {
            return;
        }
        match self.store.get(id).await {
            Ok(Some(document)) => self.cache_document(id, &document).await,
            Ok(None) => self.uncache(id).await,
            Err(err) => {
                warn!("Failed to re-read item {} for the cache, {}", id, err);
                self.uncache(id).await;
            }
        }
    }

    async fn uncache(&self, id: &str) {
        if !self.cache.is_enabled() {
            return;
        }
        if let Err(err) = self.cache.delete(id).await {
            warn!("Failed to remove item {} from cache, {}", id, err);
        }
    }
}
