//! Bounded cache of recently processed delivery ids.
//!
//! GitHub redelivers a webhook with the same `X-GitHub-Delivery` id when a
//! delivery is retried. Remembering the last few ids lets the relay drop those
//! repeats. The cache is process-local and lost on restart.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use crate::common::DeliveryId;

/// Duplicate-delivery detection used by the relay pipeline.
pub trait DeliveryDedup: Send + Sync {
    /// Returns `true` if `id` was recorded and has not been evicted since.
    #[allow(dead_code)]
    fn seen(&self, id: &DeliveryId) -> bool;

    /// Remember `id`.
    #[allow(dead_code)]
    fn record(&self, id: &DeliveryId);

    /// Record `id` unless it is already known, as one atomic step.
    ///
    /// Returns `true` if the delivery is new.
    fn check_and_record(&self, id: &DeliveryId) -> bool;

    /// Drop `id` so that a later redelivery is processed again.
    fn forget(&self, id: &DeliveryId);
}

/// In-memory FIFO cache holding at most `capacity` ids.
///
/// Eviction follows insertion order; lookups do not refresh an entry.
#[derive(Debug)]
pub struct DedupCache {
    capacity: usize,
    inner: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    order: VecDeque<DeliveryId>,
    members: HashSet<DeliveryId>,
}

impl Entries {
    fn insert(&mut self, id: &DeliveryId, capacity: usize) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push_back(id.clone());

        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        true
    }
}

impl DedupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Entries::default()),
        }
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        // Every mutation leaves order and members in sync, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeliveryDedup for DedupCache {
    fn seen(&self, id: &DeliveryId) -> bool {
        self.lock().members.contains(id)
    }

    fn record(&self, id: &DeliveryId) {
        self.lock().insert(id, self.capacity);
    }

    fn check_and_record(&self, id: &DeliveryId) -> bool {
        self.lock().insert(id, self.capacity)
    }

    fn forget(&self, id: &DeliveryId) {
        let mut entries = self.lock();
        if entries.members.remove(id) {
            entries.order.retain(|existing| existing != id);
        }
    }
}
