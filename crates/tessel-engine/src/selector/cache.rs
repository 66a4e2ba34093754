//! Caller-owned cache of parsed selectors.

use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use super::ast::Selector;
use crate::config::EngineConfig;
use crate::error::SelectorError;

/// LRU cache from selector source strings to parsed selectors.
///
/// Values are a pure function of their key, so entries can be evicted and
/// recomputed at any time. The cache holds no tree state and can be shared
/// across files behind the caller's own lock.
#[derive(Debug)]
pub struct SelectorCache {
    entries: LruCache<String, Selector>,
}

impl SelectorCache {
    /// Creates a cache holding at most `capacity` selectors.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Creates a cache sized by `config`.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.selector_cache_capacity()).unwrap_or(NonZeroUsize::MIN);
        Self::new(capacity)
    }

    /// Returns the parsed selector for `source`, parsing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed selector; failures are not
    /// cached.
    pub fn get_or_parse(&mut self, source: &str) -> Result<&Selector, SelectorError> {
        self.entries.try_get_or_insert(source.to_owned(), || {
            debug!(selector = source, "selector cache miss");
            Selector::parse(source)
        })
    }

    /// Returns the number of cached selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of cached selectors.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.cap()
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_selectors_are_reused() {
        let mut cache = SelectorCache::default();
        let first = cache.get_or_parse("CallExpression").expect("parse").clone();
        let second = cache.get_or_parse("CallExpression").expect("parse").clone();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = SelectorCache::default();
        assert!(cache.get_or_parse("CallExpression[").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_bounds_entries() {
        let config = EngineConfig::new("element", 2, crate::config::QuoteStyle::Single);
        let mut cache = SelectorCache::from_config(&config);
        for source in ["A", "B", "C"] {
            cache.get_or_parse(source).expect("parse");
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity().get(), 2);
    }
}
