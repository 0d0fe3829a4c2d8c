//! Per-node cache of derived read queries.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

use crate::node::NodeId;

/// A derived query whose answer is a list of node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Query {
    Children,
    OfType {
        type_name: String,
        sub_type: Option<String>,
    },
    Named {
        type_name: String,
        name: String,
    },
}

/// Hit and miss counters of a [`QueryCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Results keyed by node and query. Cleared wholesale by structural mutation.
#[derive(Debug, Default)]
pub(crate) struct QueryCache {
    entries: Mutex<HashMap<(NodeId, Query), Arc<[NodeId]>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    /// Return the cached answer, or compute and store it.
    ///
    /// The lock is not held while computing, so `compute` may itself query
    /// the cache.
    pub(crate) fn get_or_compute<F>(&self, node: NodeId, query: Query, compute: F) -> Arc<[NodeId]>
    where
        F: FnOnce() -> Vec<NodeId>,
    {
        let key = (node, query);
        if let Some(hit) = self.entries.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(hit);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let answer: Arc<[NodeId]> = Arc::from(compute());
        self.entries.lock().insert(key, Arc::clone(&answer));
        answer
    }

    pub(crate) fn invalidate(&self) {
        self.entries.lock().clear();
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.lock().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_second_lookup_hits() {
        let cache = QueryCache::default();
        let first = cache.get_or_compute(NodeId(0), Query::Children, || vec![NodeId(1), NodeId(2)]);
        let second = cache.get_or_compute(NodeId(0), Query::Children, || unreachable!());
        assert_eq!(first, second);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 1
            }
        );
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let cache = QueryCache::default();
        cache.get_or_compute(NodeId(0), Query::Children, Vec::new);
        cache.invalidate();
        let answer = cache.get_or_compute(NodeId(0), Query::Children, || vec![NodeId(4)]);
        assert_eq!(&*answer, &[NodeId(4)]);
        assert_eq!(cache.stats().misses, 2);
    }
}
