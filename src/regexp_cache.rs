// Copyright (C) 2025 Kashin Vladislav (Rust adaptation author)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{num::NonZeroUsize, sync::Arc};

use log::{trace, warn};
use lru::LruCache;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("An error occurred while trying to create regex: {0}")]
pub struct InvalidRegexError(#[from] regex::Error);

/// A fixed capacity cache of compiled regular expressions.
///
/// A hit only holds the LRU lock long enough to refresh the entry's
/// recency. Misses are serialized on a separate lock and re-check the cache
/// before compiling, so threads racing on one pattern compile it once and a
/// slow compile never holds up hits.
pub struct RegexCache {
    cache: Mutex<LruCache<String, Arc<regex::Regex>>>,
    compiling: Mutex<()>,
}

impl RegexCache {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| {
            warn!("Regex cache capacity must be positive, using 1");
            NonZeroUsize::MIN
        });
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            compiling: Mutex::new(()),
        }
    }

    /// Returns the compiled pattern, compiling and caching it on a miss.
    /// When the cache is full the least recently used pattern is dropped.
    pub fn get_regex(&self, pattern: &str) -> Result<Arc<regex::Regex>, InvalidRegexError> {
        if let Some(regex) = self.cache.lock().get(pattern) {
            return Ok(regex.clone());
        }
        let _compiling = self.compiling.lock();
        // another thread may have compiled it while this one waited
        if let Some(regex) = self.cache.lock().get(pattern) {
            return Ok(regex.clone());
        }
        let regex = Arc::new(regex::Regex::new(pattern)?);
        if let Some((evicted, _)) = self.cache.lock().push(pattern.to_owned(), regex.clone()) {
            trace!("Evicted regex '{}' from cache", evicted);
        }
        Ok(regex)
    }

    /// Checks for a cached pattern without touching its recency.
    pub fn contains(&self, pattern: &str) -> bool {
        self.cache.lock().contains(pattern)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::RegexCache;

    #[test]
    fn hit_returns_the_same_compiled_pattern() {
        let cache = RegexCache::with_capacity(4);
        let first = cache.get_regex(r"\d{3}").unwrap();
        let second = cache.get_regex(r"\d{3}").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = RegexCache::with_capacity(3);
        for pattern in ["1", "2", "3"] {
            cache.get_regex(pattern).unwrap();
        }
        cache.get_regex("4").unwrap();
        assert!(!cache.contains("1"));
        assert!(cache.contains("2") && cache.contains("3") && cache.contains("4"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn access_protects_from_eviction() {
        let cache = RegexCache::with_capacity(3);
        for pattern in ["1", "2", "3"] {
            cache.get_regex(pattern).unwrap();
        }
        // "1" becomes the most recently used, "2" is now the oldest
        cache.get_regex("1").unwrap();
        cache.get_regex("4").unwrap();
        assert!(cache.contains("1"));
        assert!(!cache.contains("2"));
    }

    #[test]
    fn invalid_pattern_is_not_cached() {
        let cache = RegexCache::with_capacity(2);
        assert!(cache.get_regex("(").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cache = RegexCache::with_capacity(0);
        assert_eq!(cache.capacity(), 1);
        cache.get_regex("1").unwrap();
        cache.get_regex("2").unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn hits_are_served_while_a_miss_is_compiling() {
        let cache = RegexCache::with_capacity(4);
        cache.get_regex(r"\d{3}").unwrap();
        // stands in for another thread in the middle of a compile
        let _compiling = cache.compiling.lock();
        let hit = thread::scope(|scope| {
            scope.spawn(|| cache.get_regex(r"\d{3}").unwrap().is_match("123")).join().unwrap()
        });
        assert!(hit);
    }

    #[test]
    fn shared_between_threads() {
        let cache = Arc::new(RegexCache::with_capacity(8));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let pattern = format!("{}\\d+", i % 4);
                    cache.get_regex(&pattern).unwrap().is_match(&format!("{}99", i % 4))
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.len(), 4);
    }
}
