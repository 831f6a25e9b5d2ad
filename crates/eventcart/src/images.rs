//! Image lookup with caching and fallback.
//!
//! Item images come from an external lookup service keyed by a tag. The
//! resolver caches successful lookups under a normalised tag key and swaps
//! in the configured fallback URL on any failure. Lookup errors are logged
//! and never returned.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[async_trait]
pub trait ImageLookup: Send + Sync {
    async fn fetch_image_url(&self, tag: &str) -> Result<String>;
}

/// Cache key for a tag: trimmed, lowercased, whitespace runs joined by `-`.
pub fn tag_key(tag: &str) -> String {
    tag.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub struct ImageResolver<L: ImageLookup> {
    lookup: L,
    fallback_url: String,
    cache: Mutex<HashMap<String, String>>,
}

impl<L: ImageLookup> ImageResolver<L> {
    pub fn new(lookup: L, fallback_url: impl Into<String>) -> Self {
        Self {
            lookup,
            fallback_url: fallback_url.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    pub fn cached(&self, tag: &str) -> Option<String> {
        self.cache().get(&tag_key(tag)).cloned()
    }

    /// URL for `tag`. Always returns something displayable.
    pub async fn resolve(&self, tag: &str) -> String {
        let key = tag_key(tag);
        if key.is_empty() {
            return self.fallback_url.clone();
        }
        if let Some(url) = self.cache().get(&key).cloned() {
            return url;
        }

        match self.lookup.fetch_image_url(&key).await {
            Ok(url) if !url.trim().is_empty() => {
                self.cache().insert(key, url.clone());
                url
            }
            Ok(_) => {
                tracing::warn!(tag = %key, "image lookup returned an empty url, using fallback");
                self.fallback_url.clone()
            }
            Err(err) => {
                tracing::warn!(tag = %key, error = %err, "image lookup failed, using fallback");
                self.fallback_url.clone()
            }
        }
    }
}
