//! Read batching for optimized register polling
//!
//! Coalesces a requested set of register addresses into the minimum number
//! of contiguous reads under the device span limit, and memoizes the
//! resulting plans per address set so steady-state poll cycles never
//! recompute them.

use crate::constants::PLAN_CACHE_CAPACITY;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::trace;

/// One contiguous device read: `length` registers starting at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRange {
    pub start: u16,
    pub length: u16,
}

/// Ordered sequence of contiguous reads covering a requested address set
///
/// Ranges are sorted ascending by start address for deterministic I/O
/// ordering and each spans at most the configured maximum.
pub type RangePlan = Vec<ReadRange>;

/// Coalesce `keys` into contiguous read ranges of at most `max_span` words
///
/// Addresses are sorted and greedily merged while the next address still
/// fits within `start + max_span`. A closed range covers every address
/// between its first and last requested register, because a device read
/// returns the whole contiguous block either way. Two addresses farther
/// apart than the span always split, even when the gap itself is empty.
pub fn key_sequences(keys: &[u16], max_span: u16) -> RangePlan {
    if keys.is_empty() || max_span == 0 {
        return Vec::new();
    }

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut plan = Vec::new();
    let mut start = sorted[0];
    let mut last = sorted[0];

    for &key in &sorted[1..] {
        if key - start < max_span {
            last = key;
        } else {
            plan.push(ReadRange {
                start,
                length: last - start + 1,
            });
            start = key;
            last = key;
        }
    }
    plan.push(ReadRange {
        start,
        length: last - start + 1,
    });

    plan
}

/// Bounded LRU memo of coalesced plans, keyed by the address set
///
/// The key is the sorted, deduplicated address vector, so insertion order
/// of the request never matters. Safe to share between overlapping poll
/// cycles; lookups and inserts take a short internal lock.
pub struct PlanCache {
    max_span: u16,
    plans: Mutex<LruCache<Vec<u16>, Arc<RangePlan>>>,
}

impl std::fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanCache")
            .field("max_span", &self.max_span)
            .field("cached_plans", &self.plans.lock().len())
            .finish()
    }
}

impl PlanCache {
    pub fn new(max_span: u16) -> Self {
        Self::with_capacity(max_span, PLAN_CACHE_CAPACITY)
    }

    pub fn with_capacity(max_span: u16, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            max_span,
            plans: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn max_span(&self) -> u16 {
        self.max_span
    }

    /// The coalesced plan for `keys`, computed on first sight and served
    /// from the cache afterwards
    pub fn plan<I>(&self, keys: I) -> Arc<RangePlan>
    where
        I: IntoIterator<Item = u16>,
    {
        let mut canonical: Vec<u16> = keys.into_iter().collect();
        canonical.sort_unstable();
        canonical.dedup();

        let mut plans = self.plans.lock();
        if let Some(plan) = plans.get(&canonical) {
            trace!(keys = canonical.len(), "range plan cache hit");
            return Arc::clone(plan);
        }

        let plan = Arc::new(key_sequences(&canonical, self.max_span));
        trace!(
            keys = canonical.len(),
            ranges = plan.len(),
            "computed new range plan"
        );
        plans.put(canonical, Arc::clone(&plan));
        plan
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.plans.lock().len()
    }
}
