// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Eviction-ordered tracker of the best-estimated candidates.
//!
//! Records are keyed by a derived 32-bit code of the item and indexed by
//! `(estimate, sequence)` so that the weakest record can be found and removed in
//! logarithmic time.

use std::collections::BTreeSet;
use std::collections::HashMap;

/// A tracked item together with its latest frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    item: i64,
    estimate: u64,
}

impl Candidate {
    pub(crate) fn new(item: i64, estimate: u64) -> Self {
        Self { item, estimate }
    }

    /// Returns the item value.
    pub fn item(&self) -> i64 {
        self.item
    }

    /// Returns the estimate recorded at the most recent update.
    pub fn estimate(&self) -> u64 {
        self.estimate
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    item: i64,
    estimate: u64,
    sequence: u64,
}

type OrderKey = (u64, u64, i32);

/// Largest number of records a tracker may hold.
pub const MAX_CAPACITY: usize = 1 << 26;

/// Bounded set of at most `capacity` candidates ranked by estimate.
///
/// Ties between equal estimates are resolved by update order: the record that was
/// updated least recently ranks lowest.
#[derive(Debug, Clone)]
pub struct BoundedTopK {
    capacity: usize,
    slots: HashMap<i32, Slot>,
    order: BTreeSet<OrderKey>,
    next_sequence: u64,
}

/// Returns the key a tracked item is identified by.
pub fn derived_key(item: i64) -> i32 {
    (item ^ ((item as u64) >> 32) as i64) as i32
}

impl BoundedTopK {
    /// Creates an empty tracker holding at most `capacity` records.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or exceeds [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be at least 1");
        assert!(
            capacity <= MAX_CAPACITY,
            "capacity must be at most {MAX_CAPACITY}, got {capacity}"
        );
        Self {
            capacity,
            slots: HashMap::new(),
            order: BTreeSet::new(),
            next_sequence: 0,
        }
    }

    /// Returns the maximum number of records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of live records.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no record is tracked.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the record tracked for `item`, if any.
    pub fn get(&self, item: i64) -> Option<Candidate> {
        self.slots.get(&derived_key(item)).map(candidate)
    }

    /// Inserts or replaces the record for `item`.
    ///
    /// Returns the record evicted to keep the tracker within capacity. The evicted record
    /// may be the one just inserted when its estimate is the lowest.
    pub fn upsert(&mut self, item: i64, estimate: u64) -> Option<Candidate> {
        let key = derived_key(item);
        if let Some(old) = self.slots.remove(&key) {
            self.order.remove(&(old.estimate, old.sequence, key));
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.slots.insert(
            key,
            Slot {
                item,
                estimate,
                sequence,
            },
        );
        self.order.insert((estimate, sequence, key));

        if self.slots.len() > self.capacity {
            let evicted = self.poll_min();
            if let Some(evicted) = evicted {
                tracing::trace!(
                    item = evicted.item,
                    estimate = evicted.estimate,
                    "evicted candidate"
                );
            }
            return evicted;
        }
        None
    }

    /// Removes the record for `item`.
    pub fn remove(&mut self, item: i64) -> Option<Candidate> {
        let key = derived_key(item);
        let slot = self.slots.remove(&key)?;
        self.order.remove(&(slot.estimate, slot.sequence, key));
        Some(candidate(&slot))
    }

    /// Returns the lowest ranked record without removing it.
    pub fn peek_min(&self) -> Option<Candidate> {
        let (_, _, key) = self.order.first()?;
        self.slots.get(key).map(candidate)
    }

    /// Removes and returns the lowest ranked record.
    pub fn poll_min(&mut self) -> Option<Candidate> {
        let (_, _, key) = self.order.pop_first()?;
        self.slots.remove(&key).as_ref().map(candidate)
    }

    /// Returns all records from lowest to highest rank.
    pub fn iter(&self) -> impl Iterator<Item = Candidate> + '_ {
        self.order
            .iter()
            .filter_map(|(_, _, key)| self.slots.get(key).map(candidate))
    }

    /// Removes every record, returning them from lowest to highest rank.
    pub fn drain_sorted(&mut self) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(self.slots.len());
        while let Some(next) = self.poll_min() {
            out.push(next);
        }
        out
    }
}

fn candidate(slot: &Slot) -> Candidate {
    Candidate::new(slot.item, slot.estimate)
}
