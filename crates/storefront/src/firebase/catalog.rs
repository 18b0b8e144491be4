//! Product catalog reads from the Realtime Database.
//!
//! Products live under `products/{category}/{collection}` (for example
//! `products/rings/engagement`). A collection node is either an object keyed
//! by push IDs, an array (possibly with `null` holes) or `null`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::{FirebaseError, response_text};
use crate::config::FirebaseConfig;
use crate::models::Product;

/// Client for the product catalog.
///
/// Collections are cached for the configured TTL.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    database_url: Url,
    cache: Cache<String, Arc<Vec<Product>>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &FirebaseConfig, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                database_url: config.database_url.clone(),
                cache,
            }),
        }
    }

    /// Fetch the products of one collection within a category.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError` if the request fails or the payload is not a
    /// product list.
    #[instrument(skip(self))]
    pub async fn products(
        &self,
        category: &str,
        collection: &str,
    ) -> Result<Arc<Vec<Product>>, FirebaseError> {
        let url = self.products_url(category, collection);

        if let Some(products) = self.inner.cache.get(&url).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let response = self.inner.client.get(&url).send().await?;
        let body = response_text(response).await?;
        let products = Arc::new(decode_products(serde_json::from_str(&body)?)?);

        debug!(count = products.len(), "Fetched products");
        self.inner.cache.insert(url, Arc::clone(&products)).await;
        Ok(products)
    }

    /// Drop a cached collection so the next read hits the network.
    pub async fn invalidate(&self, category: &str, collection: &str) {
        let url = self.products_url(category, collection);
        self.inner.cache.invalidate(&url).await;
    }

    fn products_url(&self, category: &str, collection: &str) -> String {
        format!(
            "{}/products/{}/{}.json",
            self.inner.database_url.as_str().trim_end_matches('/'),
            urlencoding::encode(category),
            urlencoding::encode(collection)
        )
    }
}

/// Decode a collection node into products, skipping `null` entries.
///
/// Arrays keep their order. Objects yield integer keys in numeric order,
/// then the remaining keys in key order.
///
/// # Errors
///
/// Returns `FirebaseError::Unexpected` for scalar nodes and
/// `FirebaseError::Parse` for malformed product records.
pub fn decode_products(node: Value) -> Result<Vec<Product>, FirebaseError> {
    let entries: Vec<Value> = match node {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            // Integer keys first in numeric order, then the rest in key order
            // (chronological for push IDs).
            entries.sort_by_key(|(key, _)| array_index(key).map_or((1, 0), |i| (0, i)));
            entries.into_iter().map(|(_, v)| v).collect()
        }
        other => {
            return Err(FirebaseError::Unexpected(format!(
                "expected product collection, got {other}"
            )));
        }
    };

    entries
        .into_iter()
        .filter(|v| !v.is_null())
        .map(|v| serde_json::from_value(v).map_err(FirebaseError::from))
        .collect()
}

/// Key as an array index, if it is the canonical form of one.
fn array_index(key: &str) -> Option<u32> {
    key.parse::<u32>()
        .ok()
        .filter(|i| *i != u32::MAX && i.to_string() == key)
}
