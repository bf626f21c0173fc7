//! Active layer lookup and cache-busting image invalidation.
//!
//! The layer list is owned by the Layer Panel, outside this crate. The engine
//! only needs two answers from it: which layer index is active, and the base
//! URL of that layer's rendered image. [`LayerQuery`] is that interface;
//! [`LayerTable`] is a plain implementation the host keeps in sync.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use std::collections::HashMap;

use crate::consts::CACHE_BUST_PARAM;

/// Read-only view of the Layer Panel's selection.
pub trait LayerQuery {
    /// Index of the layer currently marked active, if any.
    fn active_layer_index(&self) -> Option<usize>;

    /// Stable image URL for the layer at `index`, if it exists.
    fn layer_image_url(&self, index: usize) -> Option<String>;
}

/// Layer image URLs in panel order plus the active selection.
#[derive(Debug, Clone, Default)]
pub struct LayerTable {
    urls: Vec<String>,
    active: Option<usize>,
}

impl LayerTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the layer list. An active index past the end is dropped.
    pub fn set_layers(&mut self, urls: Vec<String>) {
        self.urls = urls;
        if self.active.is_some_and(|i| i >= self.urls.len()) {
            self.active = None;
        }
    }

    /// Mark `index` active; `None` or an out-of-range index clears the selection.
    pub fn set_active(&mut self, index: Option<usize>) {
        self.active = index.filter(|&i| i < self.urls.len());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl LayerQuery for LayerTable {
    fn active_layer_index(&self) -> Option<usize> {
        self.active
    }

    fn layer_image_url(&self, index: usize) -> Option<String> {
        self.urls.get(index).cloned()
    }
}

/// Issues cache-busted image URLs with strictly increasing tokens.
#[derive(Debug, Clone, Default)]
pub struct CacheBuster {
    last_token: u64,
}

impl CacheBuster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any query string on `url` with `?t=<token>`.
    ///
    /// The token is `now_ms`, bumped past the previous token when the clock
    /// has not advanced, so successive calls never repeat or go backwards.
    pub fn bust(&mut self, url: &str, now_ms: u64) -> String {
        let base = base_url(url);
        self.last_token = now_ms.max(self.last_token.saturating_add(1));
        format!("{base}?{CACHE_BUST_PARAM}={}", self.last_token)
    }

    #[must_use]
    pub fn last_token(&self) -> u64 {
        self.last_token
    }
}

/// The outstanding reload handle per layer index. Storing a new handle
/// hands back the one it replaces so the caller can cancel it.
#[derive(Debug)]
pub struct ReloadSlots<T> {
    slots: HashMap<usize, T>,
}

impl<T> Default for ReloadSlots<T> {
    fn default() -> Self {
        Self { slots: HashMap::new() }
    }
}

impl<T> ReloadSlots<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the replaced handle must be cancelled"]
    pub fn replace(&mut self, index: usize, handle: T) -> Option<T> {
        self.slots.insert(index, handle)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// `url` without its query string or fragment.
#[must_use]
pub fn base_url(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}
